//! # HTTP Quote Source
//!
//! Fetches the quote document with `reqwest`: fixed browser-like user agent, a bounded
//! number of redirects, connect and request timeouts, JSON body validated into a `QuoteDocument`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::domain::config::QuotesConfig;
use crate::domain::document::QuoteDocument;
use crate::domain::traits::QuoteSource;

pub struct HttpQuoteSource {
    client: reqwest::Client,
    url: String,
}

impl HttpQuoteSource {
    pub fn new(config: &QuotesConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteSource {
    async fn fetch(&self) -> Result<QuoteDocument> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", self.url))?
            .error_for_status()?;
        let body = response
            .text()
            .await
            .context("Failed to read quote database body")?;
        Ok(QuoteDocument::from_json(&body)?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
