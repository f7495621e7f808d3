//! Billing aggregation over months and over sellers.
//!
//! Both aggregations start from a [`SellerMonthIndex`], built in one pass over
//! the orders, and bill every (seller, month) group with the same
//! [`BillingPolicy`].
//!
//! Input is expected to have passed [`billing_core::validation::validate`].
//! The aggregators only re-check seller references; negative or non-finite
//! rates and volumes are billed as given, and negative quantities count as
//! zero orders. [`crate::analysis::analyze_billing`] runs validation first.

use std::collections::{BTreeMap, HashMap};

use billing_core::error::{BillingError, Result};
use billing_core::models::{MonthlyStats, Order, Seller, SellerStats};
use billing_core::policy::BillingPolicy;
use tracing::debug;

// ── SellerMonthIndex ──────────────────────────────────────────────────────────

/// All orders of one seller within one month.
#[derive(Debug, Clone)]
pub struct SellerMonthGroup<'a> {
    /// Position of the seller in the input seller slice.
    pub seller_pos: usize,
    pub seller: &'a Seller,
    pub month: &'a str,
    pub orders: Vec<&'a Order>,
}

/// Orders grouped by `(seller_id, month)`, groups kept in first-seen order.
#[derive(Debug, Clone)]
pub struct SellerMonthIndex<'a> {
    sellers: &'a [Seller],
    groups: Vec<SellerMonthGroup<'a>>,
}

impl<'a> SellerMonthIndex<'a> {
    /// Group `orders` by seller and month.
    ///
    /// An order whose seller is not in `sellers` is a
    /// [`BillingError::DanglingReference`]; run
    /// [`billing_core::validation::validate`] first to skip such orders
    /// instead.
    pub fn build(sellers: &'a [Seller], orders: &'a [Order]) -> Result<Self> {
        let by_id: HashMap<&str, usize> = sellers
            .iter()
            .enumerate()
            .map(|(pos, s)| (s.id.as_str(), pos))
            .collect();

        let mut slots: HashMap<(usize, &str), usize> = HashMap::new();
        let mut groups: Vec<SellerMonthGroup<'a>> = Vec::new();

        for order in orders {
            let Some(&seller_pos) = by_id.get(order.seller_id.as_str()) else {
                return Err(BillingError::DanglingReference {
                    order_id: order.id.clone(),
                    seller_id: order.seller_id.clone(),
                });
            };

            let slot = *slots
                .entry((seller_pos, order.month.as_str()))
                .or_insert_with(|| {
                    groups.push(SellerMonthGroup {
                        seller_pos,
                        seller: &sellers[seller_pos],
                        month: order.month.as_str(),
                        orders: Vec::new(),
                    });
                    groups.len() - 1
                });
            groups[slot].orders.push(order);
        }

        debug!(
            "Grouped {} orders into {} seller-month groups",
            orders.len(),
            groups.len()
        );

        Ok(Self { sellers, groups })
    }

    pub fn groups(&self) -> &[SellerMonthGroup<'a>] {
        &self.groups
    }

    pub fn sellers(&self) -> &'a [Seller] {
        self.sellers
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

// ── MonthlyAggregator ─────────────────────────────────────────────────────────

/// Produces one [`MonthlyStats`] per month present in the orders.
pub struct MonthlyAggregator;

impl MonthlyAggregator {
    /// Group and bill `orders`, returning months sorted newest first.
    ///
    /// `sellers` and `orders` must already be validated (see the module docs).
    pub fn aggregate(
        sellers: &[Seller],
        orders: &[Order],
        policy: &BillingPolicy,
    ) -> Result<Vec<MonthlyStats>> {
        let index = SellerMonthIndex::build(sellers, orders)?;
        Ok(Self::from_index(&index, policy))
    }

    /// Bill every group of an already built index.
    pub fn from_index(index: &SellerMonthIndex<'_>, policy: &BillingPolicy) -> Vec<MonthlyStats> {
        let mut months: BTreeMap<&str, MonthlyStats> = BTreeMap::new();

        for group in index.groups() {
            let charge = policy.charge_period(group.seller, &group.orders);
            let stats = months
                .entry(group.month)
                .or_insert_with(|| MonthlyStats::new(group.month));

            stats.total_sellers += 1;
            stats.total_orders += charge.effective_orders;
            stats.total_volume += charge.volume;
            stats.total_order_amount += charge.order_amount;
            stats.total_volume_amount += charge.volume_amount;
        }

        // Newest month first.
        months
            .into_values()
            .rev()
            .map(|mut stats| {
                stats.total_amount = stats.total_order_amount + stats.total_volume_amount;
                stats
            })
            .collect()
    }
}

// ── SellerAggregator ──────────────────────────────────────────────────────────

/// Produces one [`SellerStats`] per seller that has at least one order.
pub struct SellerAggregator;

impl SellerAggregator {
    /// Group and bill `orders`, returning sellers ranked by revenue.
    ///
    /// `sellers` and `orders` must already be validated (see the module docs).
    pub fn aggregate(
        sellers: &[Seller],
        orders: &[Order],
        policy: &BillingPolicy,
    ) -> Result<Vec<SellerStats>> {
        let index = SellerMonthIndex::build(sellers, orders)?;
        Ok(Self::from_index(&index, policy))
    }

    /// Bill every group of an already built index.
    ///
    /// Ties in revenue keep the order of the input seller slice.
    pub fn from_index(index: &SellerMonthIndex<'_>, policy: &BillingPolicy) -> Vec<SellerStats> {
        // (amount, effective orders) per seller position; None = no orders.
        let mut totals: Vec<Option<(f64, u64)>> = vec![None; index.sellers().len()];

        for group in index.groups() {
            let charge = policy.charge_period(group.seller, &group.orders);
            let entry = totals[group.seller_pos].get_or_insert((0.0, 0));
            entry.0 += charge.total_amount();
            entry.1 += charge.effective_orders;
        }

        let grand_total: f64 = totals.iter().flatten().map(|(amount, _)| amount).sum();
        if grand_total == 0.0 && !index.is_empty() {
            debug!("Grand total is zero; reporting every seller share as 0%");
        }

        let mut stats: Vec<SellerStats> = index
            .sellers()
            .iter()
            .zip(totals)
            .filter_map(|(seller, total)| {
                let (amount, orders) = total?;
                Some(SellerStats {
                    seller_id: seller.id.clone(),
                    seller_name: seller.name.clone(),
                    total_amount: amount,
                    percentage: share_of_total(amount, grand_total).unwrap_or(0.0),
                    total_orders: orders,
                })
            })
            .collect();

        stats.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount));
        stats
    }
}

/// `part / total * 100`, or [`BillingError::DivisionByZero`] when `total` is 0.
pub fn share_of_total(part: f64, total: f64) -> Result<f64> {
    if total == 0.0 {
        return Err(BillingError::DivisionByZero);
    }
    Ok(part / total * 100.0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
