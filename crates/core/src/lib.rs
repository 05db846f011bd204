//! Folio core types and portfolio analytics

pub mod error;
pub mod portfolio;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use portfolio::{
    Allocation, Asset, AssetClass, AssetFilter, Dividend, DividendKind, MonthlyDividends,
    PortfolioSummary, SortKey, SortOrder, dividends_by_month, sort_assets,
};
pub use types::{Plan, Recommendation, RecommendationAction};
