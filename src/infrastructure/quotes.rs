use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const QUOTE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("quote request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Fields kept from the provider's payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename(deserialize = "content"), alias = "quote")]
    pub quote: Option<String>,
    pub author: Option<String>,
}

/// Client for the public random-quote API used to enrich item responses.
#[derive(Clone)]
pub struct QuoteClient {
    http: reqwest::Client,
    url: String,
}

impl QuoteClient {
    pub fn new(url: impl Into<String>) -> Result<Self, QuoteError> {
        let http = reqwest::Client::builder().timeout(QUOTE_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub async fn fetch(&self) -> Result<Quote, QuoteError> {
        let quote = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<Quote>()
            .await?;
        Ok(quote)
    }
}
