//! File boundary: read one source file and decode its JSON.

use crate::{Error, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Reads `path` and parses it as JSON.
///
/// Fails with [`Error::NotFound`] when the file is missing, [`Error::Io`] when
/// it cannot be read and [`Error::Parse`] when the content is not valid JSON.
pub fn load_file(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(Error::NotFound { path: path.to_path_buf() });
    }

    let content = fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
    let json = serde_json::from_str(&content).map_err(|source| Error::Parse { path: path.to_path_buf(), source })?;

    tracing::trace!(path = %path.display(), bytes = content.len(), "loaded source file");
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::io::Write;

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"division\": ").unwrap();

        let err = load_file(file.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("had invalid JSON"));
    }

    #[test]
    fn valid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"engines\": {{}}}}").unwrap();

        let json = load_file(file.path()).unwrap();
        assert!(json.get("engines").is_some());
    }
}
