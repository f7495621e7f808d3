//! Report pipeline: validation, grouping, and both aggregations.

use billing_core::error::Result;
use billing_core::models::{MonthlyStats, Order, Seller, SellerStats};
use billing_core::policy::{BillingPolicy, MinimumChargeMode};
use billing_core::validation::{
    validate, IssueAction, MalformedPolicy, ValidationIssue, ValidationOptions,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregator::{MonthlyAggregator, SellerAggregator, SellerMonthIndex};
use crate::reader::LoadedRecords;

// ── Public types ──────────────────────────────────────────────────────────────

/// Caller choices that shape a report.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub validation: ValidationOptions,
    pub minimum_charge: MinimumChargeMode,
}

/// Cross-month totals shown under the monthly table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingTotals {
    /// Number of months reported.
    pub months: usize,
    /// Number of distinct sellers with at least one order.
    pub sellers: usize,
    pub total_orders: u64,
    pub total_volume: f64,
    pub total_order_amount: f64,
    pub total_volume_amount: f64,
    pub total_amount: f64,
}

/// Metadata produced alongside the statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// RFC 3339 timestamp when this report was generated.
    pub generated_at: String,
    pub sellers_loaded: usize,
    pub orders_loaded: usize,
    /// Orders that survived validation.
    pub orders_billed: usize,
    pub minimum_charge: MinimumChargeMode,
    /// Records that were skipped or clamped, and JSONL lines that could not
    /// be parsed, as human-readable lines.
    pub issues: Vec<String>,
}

/// The complete output of [`analyze_billing`] and [`analyze_loaded`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingReport {
    /// Newest month first.
    pub monthly: Vec<MonthlyStats>,
    /// Highest revenue first.
    pub sellers: Vec<SellerStats>,
    pub totals: BillingTotals,
    pub metadata: ReportMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full pipeline.
///
/// 1. Validate input under `options.validation`.
/// 2. Group accepted orders by seller and month.
/// 3. Run the monthly and per-seller aggregations.
/// 4. Compute totals and return a [`BillingReport`].
pub fn analyze_billing(
    sellers: &[Seller],
    orders: &[Order],
    options: &ReportOptions,
) -> Result<BillingReport> {
    let counts = (sellers.len(), orders.len());
    build_report(sellers, orders, Vec::new(), counts, options)
}

/// Run the pipeline on records read by [`crate::reader`].
///
/// Lines that failed to parse are malformed records: under
/// [`MalformedPolicy::Skip`] each becomes a `skipped` issue in
/// `metadata.issues`, otherwise the first one fails the report (there is
/// nothing to clamp). They count towards `sellers_loaded`/`orders_loaded`.
pub fn analyze_loaded(
    sellers: &LoadedRecords<Seller>,
    orders: &LoadedRecords<Order>,
    options: &ReportOptions,
) -> Result<BillingReport> {
    let mut issues = Vec::new();
    for line in sellers.unparsed.iter().chain(&orders.unparsed) {
        let error = line.to_error();
        match options.validation.malformed {
            MalformedPolicy::Skip => {
                warn!("Skipped record: {}", error);
                issues.push(ValidationIssue {
                    action: IssueAction::Skipped,
                    error,
                });
            }
            MalformedPolicy::Reject | MalformedPolicy::Clamp => return Err(error),
        }
    }

    let counts = (sellers.total(), orders.total());
    build_report(&sellers.records, &orders.records, issues, counts, options)
}

/// Shared body of [`analyze_billing`] and [`analyze_loaded`]. `issues` holds
/// problems found before validation; `loaded` is `(sellers, orders)` read.
fn build_report(
    sellers: &[Seller],
    orders: &[Order],
    mut issues: Vec<ValidationIssue>,
    loaded: (usize, usize),
    options: &ReportOptions,
) -> Result<BillingReport> {
    let mut input = validate(sellers, orders, &options.validation)?;
    issues.append(&mut input.issues);

    let policy = BillingPolicy::new(options.minimum_charge);
    let index = SellerMonthIndex::build(&input.sellers, &input.orders)?;
    let monthly = MonthlyAggregator::from_index(&index, &policy);
    let seller_stats = SellerAggregator::from_index(&index, &policy);
    let totals = calculate_totals(&monthly, &seller_stats);

    info!(
        "Billed {} orders across {} months and {} sellers: total {:.2}",
        input.orders.len(),
        totals.months,
        totals.sellers,
        totals.total_amount
    );

    let issues = issues
        .iter()
        .map(|issue| match issue.action {
            IssueAction::Skipped => format!("skipped: {}", issue.error),
            IssueAction::Clamped => format!("clamped to 0: {}", issue.error),
        })
        .collect();

    let metadata = ReportMetadata {
        generated_at: Utc::now().to_rfc3339(),
        sellers_loaded: loaded.0,
        orders_loaded: loaded.1,
        orders_billed: input.orders.len(),
        minimum_charge: options.minimum_charge,
        issues,
    };

    Ok(BillingReport {
        monthly,
        sellers: seller_stats,
        totals,
        metadata,
    })
}

/// Sum the monthly statistics into a single [`BillingTotals`].
pub fn calculate_totals(monthly: &[MonthlyStats], sellers: &[SellerStats]) -> BillingTotals {
    let mut totals = BillingTotals {
        months: monthly.len(),
        sellers: sellers.len(),
        ..Default::default()
    };
    for month in monthly {
        totals.total_orders += month.total_orders;
        totals.total_volume += month.total_volume;
        totals.total_order_amount += month.total_order_amount;
        totals.total_volume_amount += month.total_volume_amount;
    }
    totals.total_amount = totals.total_order_amount + totals.total_volume_amount;
    totals
}

// ── Tests ─────────────────────────────────────────────────────────────────────
