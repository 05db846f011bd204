//! Stock lookup API client methods

use super::{ClientError, FolioClient, path_segment};
use crate::types::{StockMatch, StockQuote};
use reqwest::Method;
use url::form_urlencoded;

impl FolioClient {
    /// Search tickers and company names
    pub async fn search_stocks(&self, query: &str) -> Result<Vec<StockMatch>, ClientError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
        self.request_json(Method::GET, &format!("/stocks/search?q={encoded}"), None)
            .await
    }

    /// Latest quote for a ticker
    pub async fn quote(&self, ticker: &str) -> Result<StockQuote, ClientError> {
        let ticker = path_segment("ticker", ticker.trim())?;
        self.request_json(
            Method::GET,
            &format!("/stocks/{}", ticker.to_ascii_uppercase()),
            None,
        )
        .await
    }
}
