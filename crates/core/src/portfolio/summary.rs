use super::asset::{Asset, AssetClass, percentage};
use crate::{CoreError, CoreResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Share of the portfolio held in one asset class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub class: AssetClass,
    pub market_value: Decimal,
    /// Percentage of total market value
    pub percentage: Decimal,
}

/// Aggregated view of a set of positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub asset_count: usize,
    pub total_invested: Decimal,
    pub market_value: Decimal,
    pub profit_loss: Decimal,
    pub return_pct: Decimal,
    pub allocation: Vec<Allocation>,
}

impl PortfolioSummary {
    /// Aggregate positions. Every asset is validated first, and totals that
    /// overflow are reported instead of wrapping or panicking.
    pub fn from_assets<'a, I>(assets: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = &'a Asset>,
    {
        let mut asset_count = 0;
        let mut total_invested = Decimal::ZERO;
        let mut market_value = Decimal::ZERO;
        let mut by_class: BTreeMap<AssetClass, Decimal> = BTreeMap::new();

        for asset in assets {
            asset.validate()?;
            let value = asset.market_value()?;

            asset_count += 1;
            total_invested = add(total_invested, asset.invested()?, "total invested")?;
            market_value = add(market_value, value, "total market value")?;
            let class_total = by_class.entry(asset.class).or_default();
            *class_total = add(*class_total, value, asset.class.as_str())?;
        }

        let allocation = by_class
            .into_iter()
            .map(|(class, value)| {
                Ok(Allocation {
                    class,
                    market_value: value,
                    percentage: percentage(value, market_value)?,
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let profit_loss = market_value
            .checked_sub(total_invested)
            .ok_or_else(|| CoreError::overflow("total profit/loss"))?;

        Ok(Self {
            asset_count,
            total_invested,
            market_value,
            profit_loss,
            return_pct: percentage(profit_loss, total_invested)?,
            allocation,
        })
    }
}

fn add(total: Decimal, value: Decimal, what: &str) -> CoreResult<Decimal> {
    total
        .checked_add(value)
        .ok_or_else(|| CoreError::overflow(what))
}
