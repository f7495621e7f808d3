use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use billing_core::BillingError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive and
/// falls back to `"warn"` if the level string is not recognised. Output goes
/// to stderr, and additionally to `log_file` when one is given.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(normalise_level(log_level)).unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

/// Map the CLI level names to tracing level names.
fn normalise_level(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

// ── Input discovery ────────────────────────────────────────────────────────────

/// `~/.billing-report/`, or `./.billing-report/` without a home directory.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".billing-report")
}

/// Resolve the sellers and orders paths.
///
/// Explicit paths win. Otherwise `data_dir` is searched for `sellers.json`
/// or `sellers.jsonl`, and for `orders.json`, `orders.jsonl` or an `orders`
/// directory, in that order.
pub fn resolve_inputs(
    sellers: Option<&Path>,
    orders: Option<&Path>,
    data_dir: &Path,
) -> Result<(PathBuf, PathBuf), BillingError> {
    let sellers = match sellers {
        Some(p) => p.to_path_buf(),
        None => first_existing(data_dir, &["sellers.json", "sellers.jsonl"]).ok_or_else(|| {
            BillingError::Config(format!(
                "no sellers file given and none found in {}",
                data_dir.display()
            ))
        })?,
    };

    let orders = match orders {
        Some(p) => p.to_path_buf(),
        None => first_existing(data_dir, &["orders.json", "orders.jsonl", "orders"]).ok_or_else(
            || {
                BillingError::Config(format!(
                    "no orders file given and none found in {}",
                    data_dir.display()
                ))
            },
        )?,
    };

    Ok((sellers, orders))
}

fn first_existing(dir: &Path, names: &[&str]) -> Option<PathBuf> {
    names.iter().map(|n| dir.join(n)).find(|p| p.exists())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
