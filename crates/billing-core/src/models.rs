use serde::{Deserialize, Serialize};

/// A seller and the rates it is billed at.
///
/// Numeric fields are signed so that malformed input survives deserialisation
/// and can be reported by [`crate::validation`] instead of failing the parse.
/// Every field is required; a missing one is a parse error, never a zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    /// Unique seller identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Charge per cubic metre of stored volume.
    pub rate_per_cubic_meter: f64,
    /// Charge per order unit in the "up to three products" tier.
    pub rate_under_three: f64,
    /// Charge per order unit in the "more than three products" tier.
    pub rate_over_three: f64,
    /// Floor on billable orders per month.
    pub minimum_order_count: i64,
}

impl Seller {
    /// The minimum order floor as an unsigned count (negative values count as 0).
    pub fn minimum_orders(&self) -> u64 {
        u64::try_from(self.minimum_order_count).unwrap_or(0)
    }
}

/// A batch of orders placed by one seller within one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order identifier.
    pub id: String,
    /// Identifier of the owning [`Seller`].
    pub seller_id: String,
    /// Opaque period key, compared as a plain string (e.g. `"2024-01"`).
    pub month: String,
    /// Orders in the "up to three products" tier.
    pub quantity_under_three: i64,
    /// Orders in the "more than three products" tier.
    pub quantity_over_three: i64,
    /// Stored volume in cubic metres.
    pub volume: f64,
}

impl Order {
    /// Orders placed in the lower tier (negative values count as 0).
    pub fn under_three(&self) -> u64 {
        u64::try_from(self.quantity_under_three).unwrap_or(0)
    }

    /// Orders placed in the upper tier (negative values count as 0).
    pub fn over_three(&self) -> u64 {
        u64::try_from(self.quantity_over_three).unwrap_or(0)
    }

    /// Sum of both tiers.
    pub fn order_count(&self) -> u64 {
        self.under_three() + self.over_three()
    }
}

/// Billing totals for one month key across every active seller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    pub month: String,
    /// Effective (floor-adjusted) orders summed over sellers.
    pub total_orders: u64,
    /// Sellers with at least one order in the month.
    pub total_sellers: u32,
    /// Always `total_order_amount + total_volume_amount`.
    pub total_amount: f64,
    /// Raw volume, not charged.
    pub total_volume: f64,
    pub total_order_amount: f64,
    pub total_volume_amount: f64,
}

impl MonthlyStats {
    /// A zeroed record for `month`.
    pub fn new(month: impl Into<String>) -> Self {
        Self {
            month: month.into(),
            ..Default::default()
        }
    }
}

/// Billing totals for one seller across every month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerStats {
    pub seller_id: String,
    pub seller_name: String,
    /// Revenue across all months.
    pub total_amount: f64,
    /// Share of the grand total, 0 to 100.
    pub percentage: f64,
    /// Effective (floor-adjusted) orders summed over months.
    pub total_orders: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seller_deserialises_camel_case() {
        let seller: Seller = serde_json::from_value(json!({
            "id": "s1",
            "name": "Acme",
            "ratePerCubicMeter": 12.5,
            "rateUnderThree": 2.0,
            "rateOverThree": 3.5,
            "minimumOrderCount": 40
        }))
        .unwrap();

        assert_eq!(seller.id, "s1");
        assert_eq!(seller.rate_per_cubic_meter, 12.5);
        assert_eq!(seller.minimum_orders(), 40);
    }

    #[test]
    fn test_seller_missing_minimum_is_parse_error() {
        let result = serde_json::from_value::<Seller>(json!({
            "id": "s1",
            "name": "Acme",
            "ratePerCubicMeter": 1.0,
            "rateUnderThree": 1.0,
            "rateOverThree": 1.0
        }));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("minimumOrderCount"));
    }

    #[test]
    fn test_negative_minimum_counts_as_zero() {
        let seller = Seller {
            id: "s1".to_string(),
            name: "Acme".to_string(),
            rate_per_cubic_meter: 0.0,
            rate_under_three: 0.0,
            rate_over_three: 0.0,
            minimum_order_count: -3,
        };
        assert_eq!(seller.minimum_orders(), 0);
    }

    #[test]
    fn test_order_count_sums_tiers() {
        let order: Order = serde_json::from_value(json!({
            "id": "o1",
            "sellerId": "s1",
            "month": "2024-01",
            "quantityUnderThree": 4,
            "quantityOverThree": 2,
            "volume": 1.5
        }))
        .unwrap();

        assert_eq!(order.under_three(), 4);
        assert_eq!(order.over_three(), 2);
        assert_eq!(order.order_count(), 6);
    }

    #[test]
    fn test_order_missing_volume_is_parse_error() {
        let result = serde_json::from_value::<Order>(json!({
            "id": "o1",
            "sellerId": "s1",
            "month": "2024-01",
            "quantityUnderThree": 1,
            "quantityOverThree": 1
        }));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("missing field `volume`"));
    }

    #[test]
    fn test_order_missing_quantity_is_parse_error() {
        let result = serde_json::from_value::<Order>(json!({
            "id": "o1",
            "sellerId": "s1",
            "month": "2024-01",
            "quantityOverThree": 1,
            "volume": 0.5
        }));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("quantityUnderThree"));
    }

    #[test]
    fn test_negative_quantity_is_representable() {
        let order: Order = serde_json::from_value(json!({
            "id": "o1",
            "sellerId": "s1",
            "month": "2024-01",
            "quantityUnderThree": -2,
            "quantityOverThree": 1,
            "volume": 0.0
        }))
        .unwrap();
        assert_eq!(order.quantity_under_three, -2);
        assert_eq!(order.order_count(), 1);
    }

    #[test]
    fn test_monthly_stats_serialises_camel_case() {
        let stats = MonthlyStats {
            month: "2024-03".to_string(),
            total_orders: 10,
            total_sellers: 2,
            total_amount: 30.0,
            total_volume: 4.0,
            total_order_amount: 20.0,
            total_volume_amount: 10.0,
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["totalOrderAmount"], json!(20.0));
        assert_eq!(value["totalSellers"], json!(2));
    }

    #[test]
    fn test_monthly_stats_new_is_zeroed() {
        let stats = MonthlyStats::new("2024-01");
        assert_eq!(stats.month, "2024-01");
        assert_eq!(stats.total_orders, 0);
        assert_eq!(stats.total_amount, 0.0);
    }
}
