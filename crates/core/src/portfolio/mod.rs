//! Client-side portfolio analytics
//!
//! Everything here operates on in-memory slices fetched from the backend:
//! filtering and sorting the asset table, aggregating totals and allocation,
//! and bucketing dividend payments by month.

mod asset;
mod dividend;
mod summary;

pub use asset::{Asset, AssetClass, AssetFilter, SortKey, SortOrder, sort_assets};
pub use dividend::{Dividend, DividendKind, MonthlyDividends, dividends_by_month};
pub use summary::{Allocation, PortfolioSummary};
