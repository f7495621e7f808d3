//! Plain-text and JSON output of a [`BillingReport`].

use std::fmt::Write;

use billing_core::models::{MonthlyStats, SellerStats};
use billing_data::analysis::{BillingReport, BillingTotals};

/// Which sections of the report to emit.
#[derive(Debug, Clone, Copy)]
pub struct Sections {
    pub monthly: bool,
    pub sellers: bool,
}

/// Render the selected sections as fixed-width text tables.
pub fn render_tables(report: &BillingReport, sections: Sections) -> String {
    let mut out = String::new();

    if sections.monthly {
        out.push_str(&render_monthly_table(&report.monthly, &report.totals));
    }
    if sections.sellers {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&render_seller_table(&report.sellers));
    }
    if !report.metadata.issues.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "{} input issue(s):", report.metadata.issues.len());
        for issue in &report.metadata.issues {
            let _ = writeln!(out, "  {issue}");
        }
    }

    out
}

/// One row per month plus a totals row.
pub fn render_monthly_table(rows: &[MonthlyStats], totals: &BillingTotals) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:>8} {:>8} {:>12} {:>14} {:>14} {:>14}",
        "Month", "Sellers", "Orders", "Volume", "Order amount", "Volume amount", "Total"
    );

    if rows.is_empty() {
        let _ = writeln!(out, "(no orders)");
        return out;
    }

    for row in rows {
        let _ = writeln!(
            out,
            "{:<8} {:>8} {:>8} {:>12.2} {:>14.2} {:>14.2} {:>14.2}",
            row.month,
            row.total_sellers,
            row.total_orders,
            row.total_volume,
            row.total_order_amount,
            row.total_volume_amount,
            row.total_amount
        );
    }

    let _ = writeln!(
        out,
        "{:<8} {:>8} {:>8} {:>12.2} {:>14.2} {:>14.2} {:>14.2}",
        "Total",
        totals.sellers,
        totals.total_orders,
        totals.total_volume,
        totals.total_order_amount,
        totals.total_volume_amount,
        totals.total_amount
    );
    out
}

/// One row per seller, highest revenue first.
pub fn render_seller_table(rows: &[SellerStats]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:<24} {:>8} {:>14} {:>8}",
        "Seller", "Name", "Orders", "Amount", "Share"
    );

    if rows.is_empty() {
        let _ = writeln!(out, "(no sellers with orders)");
        return out;
    }

    for row in rows {
        let _ = writeln!(
            out,
            "{:<12} {:<24} {:>8} {:>14.2} {:>7.1}%",
            row.seller_id, row.seller_name, row.total_orders, row.total_amount, row.percentage
        );
    }
    out
}

/// Pretty-printed JSON with the unselected sections removed.
pub fn render_json(report: &BillingReport, sections: Sections) -> serde_json::Result<String> {
    let mut value = serde_json::to_value(report)?;
    if let Some(map) = value.as_object_mut() {
        if !sections.monthly {
            map.remove("monthly");
            map.remove("totals");
        }
        if !sections.sellers {
            map.remove("sellers");
        }
    }
    serde_json::to_string_pretty(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use billing_core::models::{Order, Seller};
    use billing_data::analysis::{analyze_billing, ReportOptions};

    fn report() -> BillingReport {
        let sellers = vec![Seller {
            id: "s1".to_string(),
            name: "Acme".to_string(),
            rate_per_cubic_meter: 1.0,
            rate_under_three: 2.0,
            rate_over_three: 3.0,
            minimum_order_count: 5,
        }];
        let orders = vec![Order {
            id: "o1".to_string(),
            seller_id: "s1".to_string(),
            month: "2024-01".to_string(),
            quantity_under_three: 1,
            quantity_over_three: 1,
            volume: 10.0,
        }];
        analyze_billing(&sellers, &orders, &ReportOptions::default()).expect("report")
    }

    const ALL: Sections = Sections {
        monthly: true,
        sellers: true,
    };

    #[test]
    fn test_monthly_table_rows() {
        let r = report();
        let text = render_monthly_table(&r.monthly, &r.totals);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Month"));
        assert!(lines[1].starts_with("2024-01"));
        assert!(lines[1].ends_with("20.00"));
        assert!(lines[2].starts_with("Total"));
    }

    #[test]
    fn test_monthly_table_empty() {
        let text = render_monthly_table(&[], &BillingTotals::default());
        assert!(text.contains("(no orders)"));
    }

    #[test]
    fn test_seller_table_shows_share() {
        let r = report();
        let text = render_seller_table(&r.sellers);
        assert!(text.contains("Acme"));
        assert!(text.contains("100.0%"));
    }

    #[test]
    fn test_render_tables_respects_sections() {
        let r = report();
        let monthly_only = render_tables(
            &r,
            Sections {
                monthly: true,
                sellers: false,
            },
        );
        assert!(monthly_only.contains("Month"));
        assert!(!monthly_only.contains("Share"));

        let both = render_tables(&r, ALL);
        assert!(both.contains("Month"));
        assert!(both.contains("Share"));
    }

    #[test]
    fn test_render_json_drops_unselected_sections() {
        let r = report();
        let text = render_json(
            &r,
            Sections {
                monthly: false,
                sellers: true,
            },
        )
        .expect("json");
        let value: serde_json::Value = serde_json::from_str(&text).expect("parse");

        assert!(value.get("monthly").is_none());
        assert!(value.get("totals").is_none());
        assert_eq!(value["sellers"][0]["sellerName"], "Acme");
        assert_eq!(value["sellers"][0]["totalAmount"], 20.0);
    }

    #[test]
    fn test_render_json_full_report() {
        let r = report();
        let value: serde_json::Value =
            serde_json::from_str(&render_json(&r, ALL).expect("json")).expect("parse");
        assert_eq!(value["monthly"][0]["month"], "2024-01");
        assert_eq!(value["totals"]["totalAmount"], 20.0);
    }
}
