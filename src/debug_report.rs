use capcollect::{BuildMetrics, SourceKind, Summary};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const RED: &str = "\x1b[31m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_build(summary: &Summary, metrics: &BuildMetrics, color: bool) {
    let palette = ansi::Palette::new(color);
    println!(
        "\n{}",
        palette.bold(palette.paint(format!("⚙  Collection {} ({})", summary.version, summary.generation_date), ansi::CYAN))
    );

    println!("\n{}", palette.paint("━━━ Sources ━━━", ansi::GRAY));
    print_sources(metrics, &palette);

    println!("\n{}", palette.paint("━━━ Divisions ━━━", ansi::GRAY));
    print_divisions(summary, &palette);

    println!("\n{}", palette.paint("━━━ Records ━━━", ansi::GRAY));
    print_records(summary, &palette);

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    let loading: std::time::Duration = metrics.loads.iter().map(|l| l.duration).sum();
    println!(
        "  Total: {}  │  Loading: {}  │  User agents: {}",
        palette.paint(format!("{:?}", metrics.total), ansi::GREEN),
        palette.paint(format!("{:?}", loading), ansi::CYAN),
        palette.dim(summary.user_agents.to_string()),
    );
    println!();
}

fn print_sources(metrics: &BuildMetrics, palette: &ansi::Palette) {
    let divisions = metrics.loads.iter().filter(|l| l.kind == SourceKind::Division).count();

    for load in metrics.loads.iter().filter(|l| l.kind != SourceKind::Division) {
        println!(
            "  {} {} {}",
            palette.paint(format!("{:?}:", load.kind), ansi::BLUE),
            palette.paint(load.path.display().to_string(), ansi::YELLOW),
            palette.dim(format!("{} entries, {:?}", load.entries, load.duration)),
        );
    }
    println!("  {} {}", palette.paint("Division files:", ansi::BLUE), palette.paint(divisions.to_string(), ansi::GREEN));

    let mut slowest: Vec<_> = metrics.loads.iter().filter(|l| l.kind == SourceKind::Division).collect();
    slowest.sort_by(|a, b| b.duration.cmp(&a.duration));
    for load in slowest.iter().take(3) {
        println!("    {} {}", palette.dim(format!("{:?}", load.duration)), palette.dim(load.path.display().to_string()));
    }
}

fn print_divisions(summary: &Summary, palette: &ansi::Palette) {
    if summary.divisions.is_empty() {
        println!("{}", palette.dim("  No divisions loaded"));
        return;
    }

    for (idx, division) in summary.divisions.iter().enumerate() {
        println!(
            "  {} {} {} {}{}",
            palette.paint(format!("[{}]", idx), ansi::GRAY),
            palette.bold(palette.paint(&division.name, ansi::GREEN)),
            palette.dim("│"),
            palette.paint(format!("sortIndex {}", division.sort_index), ansi::YELLOW),
            if division.lite { palette.paint("  lite", ansi::CYAN) } else { String::new() },
        );
        println!(
            "      {} {}  {} {}  {} {}",
            palette.dim("user agents:"),
            palette.paint(division.user_agents.to_string(), ansi::BLUE),
            palette.dim("│ children:"),
            palette.paint(division.children.to_string(), ansi::BLUE),
            palette.dim("│ versions:"),
            palette.paint(division.versions.to_string(), ansi::BLUE),
        );
    }
}

fn print_records(summary: &Summary, palette: &ansi::Palette) {
    println!(
        "  Platforms: {}  │  Engines: {}",
        palette.paint(summary.platforms.to_string(), ansi::GREEN),
        palette.paint(summary.engines.to_string(), ansi::GREEN),
    );

    if summary.unresolved.is_empty() {
        println!("  {}", palette.paint("✓ all records resolve", ansi::GREEN));
        return;
    }

    for issue in &summary.unresolved {
        println!(
            "  {} {} {}",
            palette.paint(format!("✗ {:?}", issue.kind), ansi::RED),
            palette.bold(&issue.name),
            palette.dim(&issue.error),
        );
    }
}
