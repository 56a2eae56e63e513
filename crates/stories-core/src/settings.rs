use std::ffi::OsString;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use crate::brands::{BrandResolver, BrandRule};
use crate::models::{AnalysisOptions, Granularity, MissingSidePolicy, ZeroReachPolicy};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Compare Instagram Stories engagement between this year's and last year's exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "stories-dashboard",
    about = "Compare Instagram Stories engagement between this year's and last year's exports",
    version
)]
pub struct Settings {
    /// Address the dashboard server listens on
    #[arg(long, env = "STORIES_BIND", default_value = "127.0.0.1:8501")]
    pub bind: SocketAddr,

    /// Default period bucket for aggregation
    #[arg(long, env = "STORIES_GRANULARITY", value_enum, default_value_t = Granularity::Monthly)]
    pub granularity: Granularity,

    /// Engagement rate reported for groups with zero reach
    #[arg(long, env = "STORIES_ZERO_REACH", value_enum, default_value_t = ZeroReachPolicy::Zero)]
    pub zero_reach: ZeroReachPolicy,

    /// How comparisons report a period with no rows
    #[arg(long, env = "STORIES_MISSING_SIDE", value_enum, default_value_t = MissingSidePolicy::Absent)]
    pub missing_side: MissingSidePolicy,

    /// Map account names to brands (case-insensitive substring, repeatable)
    #[arg(long = "brand-rule", value_name = "PATTERN=LABEL", value_parser = BrandRule::from_str)]
    pub brand_rules: Vec<BrandRule>,

    /// Colour theme for the dashboard and HTML report
    #[arg(long, env = "STORIES_THEME", default_value = "light", value_parser = ["light", "dark"])]
    pub theme: String,

    /// Maximum accepted size of one upload request in MiB (1-512)
    #[arg(long, env = "STORIES_MAX_UPLOAD_MB", default_value = "20", value_parser = clap::value_parser!(u64).range(1..=512))]
    pub max_upload_mb: u64,

    /// Logging level
    #[arg(long, env = "STORIES_LOG_LEVEL", default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path (logs go to stderr when absent)
    #[arg(long, env = "STORIES_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and apply derived overrides.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os().collect())
    }

    /// Same as [`Settings::load`] but accepts an explicit argument list,
    /// enabling unit-testing without spawning subprocesses.
    pub fn load_from_args(args: Vec<OsString>) -> Self {
        Self::resolve(Settings::parse_from(args))
    }

    /// Fallible variant used where a bad flag must not exit the process.
    pub fn try_load_from_args(args: Vec<OsString>) -> Result<Self, clap::Error> {
        Settings::try_parse_from(args).map(Self::resolve)
    }

    /// Apply the `--debug` flag.
    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Aggregation options seeded into every new session.
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            granularity: self.granularity,
            zero_reach: self.zero_reach,
            missing_side: self.missing_side,
        }
    }

    pub fn brand_resolver(&self) -> BrandResolver {
        BrandResolver::new(self.brand_rules.clone())
    }

    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.max_upload_mb * 1024 * 1024).unwrap_or(usize::MAX)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
