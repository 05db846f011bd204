use crate::{CoreError, CoreResult};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DividendKind {
    Dividend,
    /// Interest on equity
    #[serde(rename = "jcp")]
    InterestOnEquity,
    Yield,
}

/// A single announced or paid distribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dividend {
    pub ticker: String,
    pub kind: DividendKind,
    pub amount_per_share: Decimal,
    pub quantity: Decimal,
    pub ex_date: NaiveDate,
    pub payment_date: NaiveDate,
}

impl Dividend {
    pub fn total(&self) -> CoreResult<Decimal> {
        self.amount_per_share
            .checked_mul(self.quantity)
            .ok_or_else(|| CoreError::overflow(format!("dividend total of {}", self.ticker)))
    }
}

/// Dividend income for one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyDividends {
    pub year: i32,
    pub month: u32,
    pub total: Decimal,
}

/// Group dividends by payment month, oldest first. Months without payments
/// are omitted.
pub fn dividends_by_month(dividends: &[Dividend]) -> CoreResult<Vec<MonthlyDividends>> {
    let mut buckets: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for dividend in dividends {
        let key = (dividend.payment_date.year(), dividend.payment_date.month());
        let bucket = buckets.entry(key).or_default();
        *bucket = bucket
            .checked_add(dividend.total()?)
            .ok_or_else(|| CoreError::overflow("monthly dividend total"))?;
    }

    Ok(buckets
        .into_iter()
        .map(|((year, month), total)| MonthlyDividends { year, month, total })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn dividend(ticker: &str, per_share: Decimal, qty: Decimal, paid: &str) -> Dividend {
        let payment_date = NaiveDate::parse_from_str(paid, "%Y-%m-%d").unwrap();
        Dividend {
            ticker: ticker.to_string(),
            kind: DividendKind::Dividend,
            amount_per_share: per_share,
            quantity: qty,
            ex_date: payment_date,
            payment_date,
        }
    }

    #[test]
    fn test_groups_by_payment_month_in_order() {
        let dividends = vec![
            dividend("TAEE11", dec!(0.50), dec!(100), "2024-03-15"),
            dividend("ITSA4", dec!(0.02), dec!(1000), "2024-01-02"),
            dividend("BBAS3", dec!(0.40), dec!(50), "2024-03-28"),
        ];

        let months = dividends_by_month(&dividends).unwrap();
        assert_eq!(
            months,
            vec![
                MonthlyDividends { year: 2024, month: 1, total: dec!(20) },
                MonthlyDividends { year: 2024, month: 3, total: dec!(70) },
            ]
        );
    }

    #[test]
    fn test_kind_wire_names() {
        let json = serde_json::to_string(&DividendKind::InterestOnEquity).unwrap();
        assert_eq!(json, "\"jcp\"");
        let kind: DividendKind = serde_json::from_str("\"yield\"").unwrap();
        assert_eq!(kind, DividendKind::Yield);
    }

    #[test]
    fn test_empty_input() {
        assert!(dividends_by_month(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_overflowing_total_is_an_error() {
        let huge = Decimal::from(1_000_000_000_000_000_i64);
        let dividends = vec![dividend("WHALE3", huge, huge, "2024-05-10")];
        assert!(matches!(
            dividends_by_month(&dividends),
            Err(CoreError::Overflow { .. })
        ));
    }
}
