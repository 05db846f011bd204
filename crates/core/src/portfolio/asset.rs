use crate::{CoreError, CoreResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Broad asset category used for allocation breakdowns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Stock,
    RealEstateFund,
    FixedIncome,
    Etf,
    International,
    Crypto,
}

impl AssetClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::RealEstateFund => "real_estate_fund",
            Self::FixedIncome => "fixed_income",
            Self::Etf => "etf",
            Self::International => "international",
            Self::Crypto => "crypto",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetClass {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "stock" => Ok(Self::Stock),
            "real_estate_fund" | "fii" => Ok(Self::RealEstateFund),
            "fixed_income" => Ok(Self::FixedIncome),
            "etf" => Ok(Self::Etf),
            "international" => Ok(Self::International),
            "crypto" => Ok(Self::Crypto),
            other => Err(CoreError::validation(
                "class",
                format!("unknown asset class '{other}'"),
            )),
        }
    }
}

/// A position held in the portfolio
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub ticker: String,
    pub name: String,
    pub class: AssetClass,
    pub quantity: Decimal,
    pub average_price: Decimal,
    pub current_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
}

impl Asset {
    /// Amount paid for the position
    pub fn invested(&self) -> CoreResult<Decimal> {
        self.quantity
            .checked_mul(self.average_price)
            .ok_or_else(|| CoreError::overflow(format!("invested amount of {}", self.ticker)))
    }

    /// Value of the position at the current price
    pub fn market_value(&self) -> CoreResult<Decimal> {
        self.quantity
            .checked_mul(self.current_price)
            .ok_or_else(|| CoreError::overflow(format!("market value of {}", self.ticker)))
    }

    pub fn profit_loss(&self) -> CoreResult<Decimal> {
        self.market_value()?
            .checked_sub(self.invested()?)
            .ok_or_else(|| CoreError::overflow(format!("profit/loss of {}", self.ticker)))
    }

    /// Return on the invested amount, in percent. Zero when nothing was invested.
    pub fn return_pct(&self) -> CoreResult<Decimal> {
        percentage(self.profit_loss()?, self.invested()?)
    }

    /// Reject positions that cannot be aggregated meaningfully: blank
    /// tickers, negative amounts and values too large to compute with
    pub fn validate(&self) -> CoreResult<()> {
        if self.ticker.trim().is_empty() {
            return Err(CoreError::validation("ticker", "must not be empty"));
        }
        if self.quantity.is_sign_negative() {
            return Err(CoreError::validation("quantity", "must not be negative"));
        }
        if self.average_price.is_sign_negative() || self.current_price.is_sign_negative() {
            return Err(CoreError::validation("price", "must not be negative"));
        }
        self.return_pct().map(drop)
    }
}

pub(crate) fn percentage(part: Decimal, whole: Decimal) -> CoreResult<Decimal> {
    if whole.is_zero() {
        return Ok(Decimal::ZERO);
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp(2))
        .ok_or_else(|| CoreError::overflow("percentage"))
}

/// Criteria for narrowing the asset table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetFilter {
    pub class: Option<AssetClass>,
    /// Case-insensitive match against ticker or name
    pub text: Option<String>,
    pub min_market_value: Option<Decimal>,
}

impl AssetFilter {
    pub fn matches(&self, asset: &Asset) -> bool {
        if let Some(class) = self.class
            && asset.class != class
        {
            return false;
        }

        if let Some(text) = self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let needle = text.to_lowercase();
            if !asset.ticker.to_lowercase().contains(&needle)
                && !asset.name.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        self.min_market_value
            .is_none_or(|min| asset.market_value().is_ok_and(|value| value >= min))
    }

    pub fn apply<'a>(&self, assets: &'a [Asset]) -> Vec<&'a Asset> {
        assets.iter().filter(|asset| self.matches(asset)).collect()
    }
}

/// Column the asset table can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Ticker,
    Name,
    Quantity,
    MarketValue,
    ProfitLoss,
    ReturnPct,
}

impl FromStr for SortKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "ticker" => Ok(Self::Ticker),
            "name" => Ok(Self::Name),
            "quantity" => Ok(Self::Quantity),
            "market-value" | "value" => Ok(Self::MarketValue),
            "profit-loss" | "pl" => Ok(Self::ProfitLoss),
            "return" | "return-pct" => Ok(Self::ReturnPct),
            other => Err(CoreError::validation(
                "sort",
                format!("unknown sort key '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(CoreError::validation(
                "order",
                format!("unknown sort order '{other}'"),
            )),
        }
    }
}

/// Sort assets in place. The sort is stable, so ties keep their input order
/// in both directions.
pub fn sort_assets(assets: &mut [Asset], key: SortKey, order: SortOrder) {
    assets.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

fn compare(a: &Asset, b: &Asset, key: SortKey) -> Ordering {
    match key {
        SortKey::Ticker => a.ticker.cmp(&b.ticker),
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Quantity => a.quantity.cmp(&b.quantity),
        // Values that cannot be computed sort below every real value
        SortKey::MarketValue => a.market_value().ok().cmp(&b.market_value().ok()),
        SortKey::ProfitLoss => a.profit_loss().ok().cmp(&b.profit_loss().ok()),
        SortKey::ReturnPct => a.return_pct().ok().cmp(&b.return_pct().ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn asset(ticker: &str, class: AssetClass, qty: Decimal, avg: Decimal, cur: Decimal) -> Asset {
        Asset {
            ticker: ticker.to_string(),
            name: format!("{ticker} Holdings"),
            class,
            quantity: qty,
            average_price: avg,
            current_price: cur,
            sector: None,
        }
    }

    #[test]
    fn test_position_math() {
        let a = asset("PETR4", AssetClass::Stock, dec!(100), dec!(30), dec!(33));
        assert_eq!(a.invested().unwrap(), dec!(3000));
        assert_eq!(a.market_value().unwrap(), dec!(3300));
        assert_eq!(a.profit_loss().unwrap(), dec!(300));
        assert_eq!(a.return_pct().unwrap(), dec!(10));
    }

    #[test]
    fn test_return_pct_zero_invested() {
        let a = asset("GIFT", AssetClass::Stock, dec!(10), dec!(0), dec!(5));
        assert_eq!(a.return_pct().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_huge_position_overflows_without_panicking() {
        let huge = Decimal::from(1_000_000_000_000_000_i64);
        let a = asset("WHALE3", AssetClass::Stock, huge, dec!(1), huge);
        assert!(matches!(a.market_value(), Err(CoreError::Overflow { .. })));
        assert!(matches!(a.validate(), Err(CoreError::Overflow { .. })));

        // Still usable in filters and sorts
        let filter = AssetFilter {
            min_market_value: Some(dec!(1)),
            ..AssetFilter::default()
        };
        assert!(!filter.matches(&a));
        let mut assets = vec![a, asset("SMALL", AssetClass::Stock, dec!(1), dec!(1), dec!(1))];
        sort_assets(&mut assets, SortKey::MarketValue, SortOrder::Descending);
        assert_eq!(assets[0].ticker, "SMALL");
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let a = asset("NEG", AssetClass::Stock, dec!(1), dec!(10), dec!(-1));
        assert!(matches!(
            a.validate(),
            Err(CoreError::Validation { ref field, .. }) if field == "price"
        ));
        let ok = asset("OK", AssetClass::Stock, dec!(1), dec!(10), dec!(12));
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_quantity() {
        let a = asset("BAD", AssetClass::Stock, dec!(-1), dec!(10), dec!(10));
        assert!(matches!(
            a.validate(),
            Err(CoreError::Validation { ref field, .. }) if field == "quantity"
        ));
        let empty = asset("  ", AssetClass::Stock, dec!(1), dec!(10), dec!(10));
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_filter_by_class_and_text() {
        let assets = vec![
            asset("PETR4", AssetClass::Stock, dec!(10), dec!(30), dec!(31)),
            asset("HGLG11", AssetClass::RealEstateFund, dec!(5), dec!(160), dec!(158)),
            asset("VALE3", AssetClass::Stock, dec!(20), dec!(60), dec!(65)),
        ];

        let stocks = AssetFilter {
            class: Some(AssetClass::Stock),
            ..AssetFilter::default()
        };
        let tickers: Vec<_> = stocks.apply(&assets).iter().map(|a| a.ticker.as_str()).collect();
        assert_eq!(tickers, ["PETR4", "VALE3"]);

        let text = AssetFilter {
            text: Some("hglg".to_string()),
            ..AssetFilter::default()
        };
        assert_eq!(text.apply(&assets).len(), 1);

        let min_value = AssetFilter {
            min_market_value: Some(dec!(1000)),
            ..AssetFilter::default()
        };
        let tickers: Vec<_> = min_value.apply(&assets).iter().map(|a| a.ticker.as_str()).collect();
        assert_eq!(tickers, ["VALE3"]);
    }

    #[test]
    fn test_blank_text_matches_everything() {
        let assets = vec![asset("ITSA4", AssetClass::Stock, dec!(1), dec!(1), dec!(1))];
        let filter = AssetFilter {
            text: Some("   ".to_string()),
            ..AssetFilter::default()
        };
        assert_eq!(filter.apply(&assets).len(), 1);
    }

    #[test]
    fn test_sort_is_stable_in_both_directions() {
        let mut assets = vec![
            asset("AAA", AssetClass::Stock, dec!(10), dec!(1), dec!(1)),
            asset("BBB", AssetClass::Stock, dec!(5), dec!(1), dec!(1)),
            asset("CCC", AssetClass::Stock, dec!(10), dec!(1), dec!(1)),
        ];

        sort_assets(&mut assets, SortKey::Quantity, SortOrder::Descending);
        let tickers: Vec<_> = assets.iter().map(|a| a.ticker.as_str()).collect();
        assert_eq!(tickers, ["AAA", "CCC", "BBB"]);

        sort_assets(&mut assets, SortKey::Quantity, SortOrder::Ascending);
        let tickers: Vec<_> = assets.iter().map(|a| a.ticker.as_str()).collect();
        assert_eq!(tickers, ["BBB", "AAA", "CCC"]);
    }

    #[test]
    fn test_sort_by_return() {
        let mut assets = vec![
            asset("LOSS", AssetClass::Stock, dec!(1), dec!(100), dec!(90)),
            asset("GAIN", AssetClass::Stock, dec!(1), dec!(100), dec!(150)),
            asset("FLAT", AssetClass::Stock, dec!(1), dec!(100), dec!(100)),
        ];
        sort_assets(&mut assets, SortKey::ReturnPct, SortOrder::Descending);
        let tickers: Vec<_> = assets.iter().map(|a| a.ticker.as_str()).collect();
        assert_eq!(tickers, ["GAIN", "FLAT", "LOSS"]);
    }

    #[test]
    fn test_parse_sort_options() {
        assert_eq!("market_value".parse::<SortKey>().unwrap(), SortKey::MarketValue);
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Ascending);
        assert_eq!("fii".parse::<AssetClass>().unwrap(), AssetClass::RealEstateFund);
        assert!("sideways".parse::<SortKey>().is_err());
    }
}
