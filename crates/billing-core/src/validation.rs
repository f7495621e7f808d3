//! Boundary checks run once before aggregation.
//!
//! Every rejected, skipped or clamped record is decided here so that the
//! aggregators only ever see non-negative numbers, non-empty month keys and
//! orders whose seller exists.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::{BillingError, RecordKind, Result};
use crate::models::{Order, Seller};

/// What to do with an order whose `seller_id` is not in the seller set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DanglingPolicy {
    /// Fail with [`BillingError::DanglingReference`].
    #[default]
    Reject,
    /// Drop the order and record an issue.
    Skip,
}

impl DanglingPolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "reject" => Some(Self::Reject),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }
}

/// What to do with a record carrying a negative or non-finite number, or an
/// empty month key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Fail with [`BillingError::MalformedRecord`].
    #[default]
    Reject,
    /// Replace bad numbers with zero. Empty month keys are still rejected.
    Clamp,
    /// Drop the record and record an issue.
    Skip,
}

impl MalformedPolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "reject" => Some(Self::Reject),
            "clamp" => Some(Self::Clamp),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }
}

/// Caller-selected handling of invalid input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    pub dangling: DanglingPolicy,
    pub malformed: MalformedPolicy,
}

/// How a problem record was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueAction {
    Skipped,
    Clamped,
}

/// A problem that did not abort validation.
#[derive(Debug)]
pub struct ValidationIssue {
    pub action: IssueAction,
    pub error: BillingError,
}

/// Input that passed validation, ready for aggregation.
#[derive(Debug, Default)]
pub struct ValidatedInput {
    pub sellers: Vec<Seller>,
    pub orders: Vec<Order>,
    pub issues: Vec<ValidationIssue>,
}

/// Returns `true` when `month` can serve as a period key.
///
/// Keys are opaque and only compared as strings, so anything non-blank is
/// accepted (`"2024-01"`, `"2024-Q1"`, `"202401"`).
pub fn has_month_key(month: &str) -> bool {
    !month.trim().is_empty()
}

/// Validate `sellers` and `orders` under `options`.
///
/// Duplicate seller ids are always an error. Sellers dropped under
/// [`MalformedPolicy::Skip`] make their orders dangling, which are then
/// handled by the dangling policy.
pub fn validate(
    sellers: &[Seller],
    orders: &[Order],
    options: &ValidationOptions,
) -> Result<ValidatedInput> {
    let mut result = ValidatedInput::default();

    let mut seen: HashSet<&str> = HashSet::new();
    for seller in sellers {
        if !seen.insert(seller.id.as_str()) {
            return Err(BillingError::DuplicateSeller(seller.id.clone()));
        }
        if let Some(seller) = check_seller(seller, options.malformed, &mut result.issues)? {
            result.sellers.push(seller);
        }
    }

    let known: HashSet<&str> = result.sellers.iter().map(|s| s.id.as_str()).collect();
    let mut accepted = Vec::with_capacity(orders.len());
    for order in orders {
        let Some(order) = check_order(order, options.malformed, &mut result.issues)? else {
            continue;
        };
        if !known.contains(order.seller_id.as_str()) {
            let error = BillingError::DanglingReference {
                order_id: order.id.clone(),
                seller_id: order.seller_id.clone(),
            };
            match options.dangling {
                DanglingPolicy::Reject => return Err(error),
                DanglingPolicy::Skip => {
                    warn!("Skipping order: {}", error);
                    result.issues.push(ValidationIssue {
                        action: IssueAction::Skipped,
                        error,
                    });
                    continue;
                }
            }
        }
        accepted.push(order);
    }
    result.orders = accepted;

    debug!(
        "Validated {} sellers and {} orders ({} issues)",
        result.sellers.len(),
        result.orders.len(),
        result.issues.len()
    );

    Ok(result)
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// A single bad field: name, offending value, and whether zero is a valid
/// replacement.
struct FieldProblem {
    field: &'static str,
    value: String,
    clampable: bool,
}

fn bad_rate(field: &'static str, value: f64, out: &mut Vec<FieldProblem>) {
    if !value.is_finite() || value < 0.0 {
        out.push(FieldProblem {
            field,
            value: value.to_string(),
            clampable: true,
        });
    }
}

fn bad_count(field: &'static str, value: i64, out: &mut Vec<FieldProblem>) {
    if value < 0 {
        out.push(FieldProblem {
            field,
            value: value.to_string(),
            clampable: true,
        });
    }
}

fn clamp_rate(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Turn the problems of one record into issues, or an error under `policy`.
///
/// Returns `Ok(true)` when the record should be kept (possibly after
/// clamping) and `Ok(false)` when it should be dropped.
fn resolve(
    kind: RecordKind,
    id: &str,
    problems: Vec<FieldProblem>,
    policy: MalformedPolicy,
    issues: &mut Vec<ValidationIssue>,
) -> Result<bool> {
    if problems.is_empty() {
        return Ok(true);
    }

    let to_error = |p: &FieldProblem| BillingError::MalformedRecord {
        kind,
        id: id.to_string(),
        field: p.field,
        value: p.value.clone(),
    };

    let action = match policy {
        MalformedPolicy::Reject => return Err(to_error(&problems[0])),
        MalformedPolicy::Clamp => {
            if let Some(p) = problems.iter().find(|p| !p.clampable) {
                return Err(to_error(p));
            }
            IssueAction::Clamped
        }
        MalformedPolicy::Skip => IssueAction::Skipped,
    };

    for problem in &problems {
        let error = to_error(problem);
        warn!("{:?} record: {}", action, error);
        issues.push(ValidationIssue { action, error });
    }

    Ok(action == IssueAction::Clamped)
}

fn check_seller(
    seller: &Seller,
    policy: MalformedPolicy,
    issues: &mut Vec<ValidationIssue>,
) -> Result<Option<Seller>> {
    let mut problems = Vec::new();
    bad_rate("ratePerCubicMeter", seller.rate_per_cubic_meter, &mut problems);
    bad_rate("rateUnderThree", seller.rate_under_three, &mut problems);
    bad_rate("rateOverThree", seller.rate_over_three, &mut problems);
    bad_count("minimumOrderCount", seller.minimum_order_count, &mut problems);

    if !resolve(RecordKind::Seller, &seller.id, problems, policy, issues)? {
        return Ok(None);
    }

    Ok(Some(Seller {
        rate_per_cubic_meter: clamp_rate(seller.rate_per_cubic_meter),
        rate_under_three: clamp_rate(seller.rate_under_three),
        rate_over_three: clamp_rate(seller.rate_over_three),
        minimum_order_count: seller.minimum_order_count.max(0),
        ..seller.clone()
    }))
}

fn check_order(
    order: &Order,
    policy: MalformedPolicy,
    issues: &mut Vec<ValidationIssue>,
) -> Result<Option<Order>> {
    let mut problems = Vec::new();
    if !has_month_key(&order.month) {
        problems.push(FieldProblem {
            field: "month",
            value: order.month.clone(),
            clampable: false,
        });
    }
    bad_count("quantityUnderThree", order.quantity_under_three, &mut problems);
    bad_count("quantityOverThree", order.quantity_over_three, &mut problems);
    bad_rate("volume", order.volume, &mut problems);

    if !resolve(RecordKind::Order, &order.id, problems, policy, issues)? {
        return Ok(None);
    }

    Ok(Some(Order {
        quantity_under_three: order.quantity_under_three.max(0),
        quantity_over_three: order.quantity_over_three.max(0),
        volume: clamp_rate(order.volume),
        ..order.clone()
    }))
}
