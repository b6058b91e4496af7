use crate::collection::{Collection, LoadMetrics, RecordKind, SourceKind};
use crate::{Error, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Build options for [`create_collection`].
#[derive(Debug, Clone)]
pub struct Options {
    /// Directory holding `platforms.json`, `engines.json`, `core/` and `user-agents/`.
    pub resources_dir: PathBuf,
    /// Version label handed to writers.
    pub version: String,
    /// Generation date; `None` stamps the current local time.
    pub generation_date: Option<NaiveDateTime>,
    /// Verify that every `Parent` names a known key after loading.
    pub check_parents: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            resources_dir: PathBuf::from("resources"),
            version: env!("CARGO_PKG_VERSION").to_string(),
            generation_date: None,
            check_parents: true,
        }
    }
}

/// Timing for a whole build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildMetrics {
    pub total: Duration,
    /// One entry per source file, in load order.
    pub loads: Vec<LoadMetrics>,
}

/// Result of [`create_collection_with_metrics`].
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub collection: Collection,
    pub metrics: BuildMetrics,
}

/// Compact, serializable overview of a built collection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub version: String,
    pub generation_date: String,
    pub platforms: usize,
    pub engines: usize,
    pub user_agents: usize,
    /// In sorted order.
    pub divisions: Vec<DivisionSummary>,
    /// Records that fail to resolve.
    pub unresolved: Vec<RecordIssue>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionSummary {
    pub name: String,
    pub sort_index: i64,
    pub lite: bool,
    pub versions: usize,
    pub user_agents: usize,
    pub children: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordIssue {
    pub kind: RecordKind,
    pub name: String,
    pub error: String,
}

/// Builds a collection from the resource directory in `options`.
///
/// Load order: platforms, engines, default properties, default browser, then
/// every `*.json` below `user-agents/` sorted by path.
pub fn create_collection(options: &Options) -> Result<Collection> {
    create_collection_with_metrics(options).map(|built| built.collection)
}

/// Like [`create_collection`], with per-file timings.
pub fn create_collection_with_metrics(options: &Options) -> Result<BuildResult> {
    let start = Instant::now();
    let dir = options.resources_dir.as_path();

    let mut collection = Collection::new(options.version.clone());
    if let Some(date) = options.generation_date {
        collection = collection.with_generation_date(date);
    }

    let mut loads = vec![
        timed(SourceKind::Platforms, dir.join("platforms.json"), |path| {
            collection.add_platforms_file(path).map(|table| (table.len(), 0))
        })?,
        timed(SourceKind::Engines, dir.join("engines.json"), |path| {
            collection.add_engines_file(path).map(|table| (table.len(), 0))
        })?,
        timed(SourceKind::DefaultProperties, dir.join("core").join("default-properties.json"), |path| {
            collection.add_default_properties_file(path).map(|()| (1, 0))
        })?,
        timed(SourceKind::DefaultBrowser, dir.join("core").join("default-browser.json"), |path| {
            collection.add_default_browser_file(path).map(|()| (1, 0))
        })?,
    ];

    for path in division_files(&dir.join("user-agents"))? {
        loads.push(timed(SourceKind::Division, path, |path| {
            collection.add_source_file(path).map(|division| (division.user_agents().len(), division.child_count()))
        })?);
    }

    if options.check_parents {
        collection.check_parents()?;
    }
    collection.sort_divisions();

    let metrics = BuildMetrics { total: start.elapsed(), loads };
    tracing::info!(
        files = metrics.loads.len(),
        divisions = collection.loaded_divisions().len(),
        user_agents = collection.user_agent_count(),
        elapsed = ?metrics.total,
        "collection built"
    );

    Ok(BuildResult { collection, metrics })
}

/// Summarizes `collection`, resolving every platform and engine.
pub fn summarize(collection: &mut Collection) -> Summary {
    let mut unresolved = Vec::new();
    for kind in [RecordKind::Platform, RecordKind::Engine] {
        let table = match kind {
            RecordKind::Platform => collection.platforms(),
            RecordKind::Engine => collection.engines(),
        };
        for name in table.names() {
            if let Err(err) = collection.record(kind, name) {
                unresolved.push(RecordIssue { kind, name: name.to_string(), error: err.to_string() });
            }
        }
    }

    let platforms = collection.platforms().len();
    let engines = collection.engines().len();
    let user_agents = collection.user_agent_count();
    let version = collection.version().to_string();
    let generation_date = collection.generation_date().format("%Y-%m-%d %H:%M:%S").to_string();

    let divisions = collection
        .divisions()
        .into_iter()
        .map(|d| DivisionSummary {
            name: d.name().to_string(),
            sort_index: d.sort_index(),
            lite: d.lite(),
            versions: d.versions().len(),
            user_agents: d.user_agents().len(),
            children: d.child_count(),
        })
        .collect();

    Summary { version, generation_date, platforms, engines, user_agents, divisions, unresolved }
}

fn timed<F>(kind: SourceKind, path: PathBuf, load: F) -> Result<LoadMetrics>
where
    F: FnOnce(&Path) -> Result<(usize, usize)>,
{
    let start = Instant::now();
    let (entries, children) = load(&path)?;
    Ok(LoadMetrics { kind, path, duration: start.elapsed(), entries, children })
}

/// All `*.json` files below `dir`, sorted by path.
fn division_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::NotFound { path: dir.to_path_buf() });
    }

    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = fs::read_dir(&current).map_err(|source| Error::Io { path: current.clone(), source })?;
        for entry in entries {
            let path = entry.map_err(|source| Error::Io { path: current.clone(), source })?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use chrono::NaiveDate;
    use serde_json::json;

    fn write(path: &Path, value: serde_json::Value) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, value.to_string()).unwrap();
    }

    fn resources() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        write(
            &root.join("platforms.json"),
            json!({ "platforms": {
                "WinNT": { "properties": { "Platform": "WinNT", "Win32": true } },
                "Win7": { "inherits": "WinNT", "properties": { "Platform": "Win7", "Platform_Version": "6.1" } }
            }}),
        );
        write(
            &root.join("engines.json"),
            json!({ "engines": { "Gecko": { "properties": { "RenderingEngine_Name": "Gecko" } } } }),
        );
        write(
            &root.join("core/default-properties.json"),
            json!({ "userAgent": "DefaultProperties", "properties": { "Comment": "DefaultProperties" } }),
        );
        write(
            &root.join("core/default-browser.json"),
            json!({ "userAgent": "*", "properties": { "Parent": "DefaultProperties" } }),
        );
        write(
            &root.join("user-agents/browsers/firefox.json"),
            json!({
                "division": "Firefox",
                "sortIndex": 10,
                "versions": ["27.0", "28.0"],
                "userAgents": [{
                    "userAgent": "Firefox #MAJORVER#.#MINORVER#",
                    "properties": { "Parent": "DefaultProperties", "Browser": "Firefox" },
                    "children": [ { "match": "Mozilla/5.0 (*) Gecko/* Firefox/#MAJORVER#.#MINORVER#*" } ]
                }]
            }),
        );
        write(
            &root.join("user-agents/bots.json"),
            json!({
                "division": "Bots",
                "sortIndex": 2,
                "lite": true,
                "userAgents": [ { "userAgent": "Googlebot*", "properties": { "Parent": "DefaultProperties", "Crawler": true } } ]
            }),
        );
        write(&root.join("user-agents/README.md.txt"), json!("ignored"));

        dir
    }

    fn options(dir: &Path) -> Options {
        let date = NaiveDate::from_ymd_opt(2014, 2, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
        Options { resources_dir: dir.to_path_buf(), version: "5021".to_string(), generation_date: Some(date), check_parents: true }
    }

    #[test]
    fn builds_from_resource_directory() {
        let dir = resources();
        let built = create_collection_with_metrics(&options(dir.path())).unwrap();

        // platforms, engines, 2 defaults, 2 divisions (sorted by path: bots.json before browsers/)
        assert_eq!(built.metrics.loads.len(), 6);
        let division_loads: Vec<_> = built.metrics.loads.iter().filter(|l| l.kind == SourceKind::Division).collect();
        assert!(division_loads[0].path.ends_with("bots.json"));
        assert_eq!(division_loads[1].entries, 1);
        assert_eq!(division_loads[1].children, 1);

        let mut collection = built.collection;
        assert!(collection.is_sorted());
        assert_eq!(collection.version(), "5021");
        let order: Vec<&str> = collection.divisions().iter().map(|d| d.name()).collect();
        assert_eq!(order, ["Bots", "Firefox"]);
    }

    #[test]
    fn summary_lists_divisions_and_resolves_records() {
        let dir = resources();
        let mut collection = create_collection(&options(dir.path())).unwrap();
        let summary = summarize(&mut collection);

        assert_eq!(summary.platforms, 2);
        assert_eq!(summary.engines, 1);
        assert_eq!(summary.user_agents, 2);
        assert_eq!(summary.generation_date, "2014-02-01 08:00:00");
        assert!(summary.unresolved.is_empty());
        assert_eq!(summary.divisions[1].name, "Firefox");
        assert_eq!(summary.divisions[1].versions, 2);
        assert!(summary.divisions[0].lite);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["divisions"][0]["name"], "Bots");
        assert_eq!(json["divisions"][1]["sortIndex"], 10);
        assert_eq!(json["generationDate"], "2014-02-01 08:00:00");
        assert_eq!(json["userAgents"], 2);
    }

    #[test]
    fn summary_reports_unresolvable_records() {
        let dir = resources();
        write(
            &dir.path().join("platforms.json"),
            json!({ "platforms": {
                "WinNT": { "properties": { "Platform": "WinNT" } },
                "Win7": { "inherits": "WinNT", "properties": { "Platform": "WinNT" } }
            }}),
        );

        let mut collection = create_collection(&options(dir.path())).unwrap();
        let summary = summarize(&mut collection);
        assert_eq!(summary.unresolved.len(), 1);
        assert_eq!(summary.unresolved[0].name, "Win7");
        assert_eq!(summary.unresolved[0].kind, RecordKind::Platform);
    }

    #[test]
    fn dangling_parent_stops_the_build() {
        let dir = resources();
        write(
            &dir.path().join("user-agents/zz.json"),
            json!({
                "division": "Broken",
                "sortIndex": 3,
                "userAgents": [ { "userAgent": "Broken*", "properties": { "Parent": "Missing" } } ]
            }),
        );

        let err = create_collection(&options(dir.path())).unwrap_err();
        assert!(matches!(err, Error::DanglingParent { .. }));

        let lenient = Options { check_parents: false, ..options(dir.path()) };
        assert!(create_collection(&lenient).is_ok());
    }

    #[test]
    fn missing_user_agents_directory() {
        let dir = resources();
        fs::remove_dir_all(dir.path().join("user-agents")).unwrap();

        let err = create_collection(&options(dir.path())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
