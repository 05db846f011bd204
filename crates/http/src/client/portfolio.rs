//! Portfolio API client methods

use super::{ClientError, FolioClient};
use folio_core::{Asset, Dividend, PortfolioSummary, Recommendation};
use reqwest::Method;

impl FolioClient {
    /// Positions held by the signed-in user. Positions that fail validation
    /// reject the whole list.
    pub async fn assets(&self) -> Result<Vec<Asset>, ClientError> {
        let assets: Vec<Asset> = self
            .request_json(Method::GET, "/portfolio/assets", None)
            .await?;
        for asset in &assets {
            asset.validate()?;
        }
        Ok(assets)
    }

    pub async fn dividends(&self) -> Result<Vec<Dividend>, ClientError> {
        self.request_json(Method::GET, "/portfolio/dividends", None)
            .await
    }

    /// Generated buy/hold/sell suggestions
    pub async fn recommendations(&self) -> Result<Vec<Recommendation>, ClientError> {
        self.request_json(Method::GET, "/portfolio/recommendations", None)
            .await
    }

    /// Fetch the assets and aggregate them locally
    pub async fn portfolio_summary(&self) -> Result<PortfolioSummary, ClientError> {
        let assets = self.assets().await?;
        Ok(PortfolioSummary::from_assets(&assets)?)
    }
}
