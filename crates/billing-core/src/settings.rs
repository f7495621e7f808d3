use clap::Parser;
use std::path::PathBuf;

use crate::policy::MinimumChargeMode;
use crate::validation::{DanglingPolicy, MalformedPolicy, ValidationOptions};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Monthly and per-seller billing statistics
#[derive(Parser, Debug, Clone)]
#[command(
    name = "billing-report",
    about = "Monthly and per-seller billing statistics",
    version
)]
pub struct Settings {
    /// Sellers file (.json array or .jsonl)
    #[arg(long)]
    pub sellers: Option<PathBuf>,

    /// Orders file (.json array or .jsonl) or a directory of them
    #[arg(long)]
    pub orders: Option<PathBuf>,

    /// Directory searched for sellers.json and orders when no explicit path is given
    #[arg(long, env = "BILLING_REPORT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Which statistics to show
    #[arg(long, default_value = "all", value_parser = ["monthly", "sellers", "all"])]
    pub view: String,

    /// Output format
    #[arg(long, default_value = "table", value_parser = ["table", "json"])]
    pub format: String,

    /// Handling of orders that reference an unknown seller
    #[arg(long, default_value = "reject", value_parser = ["reject", "skip"])]
    pub on_dangling: String,

    /// Handling of records with negative or invalid values
    #[arg(long, default_value = "reject", value_parser = ["reject", "clamp", "skip"])]
    pub on_malformed: String,

    /// How often the minimum-order floor is charged within a seller-month
    #[arg(long, default_value = "per-period", value_parser = ["per-period", "per-order"])]
    pub minimum_charge: String,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and apply overrides.
    pub fn load() -> Self {
        Self::resolve(Self::parse())
    }

    /// Same as [`Settings::load`] but with an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::resolve(Self::parse_from(args))
    }

    /// `--debug` overrides the log level.
    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Validation policies selected on the command line.
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            dangling: DanglingPolicy::from_name(&self.on_dangling).unwrap_or_default(),
            malformed: MalformedPolicy::from_name(&self.on_malformed).unwrap_or_default(),
        }
    }

    /// Minimum-charge mode selected on the command line.
    pub fn minimum_charge_mode(&self) -> MinimumChargeMode {
        MinimumChargeMode::from_name(&self.minimum_charge).unwrap_or_default()
    }

    pub fn wants_monthly(&self) -> bool {
        self.view != "sellers"
    }

    pub fn wants_sellers(&self) -> bool {
        self.view != "monthly"
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
