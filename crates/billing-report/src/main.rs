mod bootstrap;
mod render;

use anyhow::{Context, Result};
use billing_core::settings::Settings;
use billing_data::analysis::{analyze_loaded, ReportOptions};
use billing_data::reader::{load_orders, load_sellers};

use crate::render::Sections;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Billing report v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Format: {}, Minimum charge: {}",
        settings.view,
        settings.format,
        settings.minimum_charge
    );

    let data_dir = settings
        .data_dir
        .clone()
        .unwrap_or_else(bootstrap::default_data_dir);
    let (sellers_path, orders_path) = bootstrap::resolve_inputs(
        settings.sellers.as_deref(),
        settings.orders.as_deref(),
        &data_dir,
    )?;

    let sellers = load_sellers(&sellers_path)
        .with_context(|| format!("loading sellers from {}", sellers_path.display()))?;
    let orders = load_orders(&orders_path)
        .with_context(|| format!("loading orders from {}", orders_path.display()))?;

    let options = ReportOptions {
        validation: settings.validation_options(),
        minimum_charge: settings.minimum_charge_mode(),
    };
    let report = analyze_loaded(&sellers, &orders, &options)?;

    let sections = Sections {
        monthly: settings.wants_monthly(),
        sellers: settings.wants_sellers(),
    };

    let output = match settings.format.as_str() {
        "json" => render::render_json(&report, sections)?,
        _ => render::render_tables(&report, sections),
    };
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }

    Ok(())
}
