// src/exchange/binance.rs

use super::{Exchange, ExchangeError, QueryParams, RequestSigner};
use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Binance spot REST client. One attempt per call, bounded by the timeout.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    api_key: String,
    signer: RequestSigner,
    client: Client,
    base_url: Url,
}

impl BinanceClient {
    pub fn new(key: &str, secret: &str, base_url: &Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("HTTP client build error")?;

        // join() only keeps a base path when it ends with '/'
        let mut base_url = base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            api_key: key.to_string(),
            signer: RequestSigner::new(secret),
            client,
            base_url,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(
            &cfg.api_key,
            &cfg.api_secret,
            &cfg.base_url,
            cfg.request_timeout,
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ExchangeError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Sends the request once and returns the raw body of a non-error answer.
    async fn execute(&self, req: RequestBuilder, path: &str) -> Result<String, ExchangeError> {
        let resp = req.header(API_KEY_HEADER, &self.api_key).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if status.as_u16() >= 400 {
            warn!(path, status = status.as_u16(), body = %body, "Upstream rejected request");
            return Err(ExchangeError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        debug!(path, status = status.as_u16(), "Upstream call succeeded");
        Ok(body)
    }
}

#[async_trait]
impl Exchange for BinanceClient {
    async fn get(
        &self,
        path: &str,
        params: QueryParams,
        signed: bool,
    ) -> Result<Value, ExchangeError> {
        let mut url = self.endpoint(path)?;
        let qs = self.signer.encode(params, signed);
        if !qs.is_empty() {
            url.set_query(Some(&qs));
        }
        debug!(path, signed, "GET upstream");

        let body = self.execute(self.client.get(url), path).await?;
        serde_json::from_str(&body).map_err(|e| ExchangeError::Decode(e.to_string()))
    }

    async fn post(
        &self,
        path: &str,
        params: QueryParams,
        signed: bool,
    ) -> Result<Value, ExchangeError> {
        let url = self.endpoint(path)?;
        let body = self.signer.encode(params, signed);
        debug!(path, signed, "POST upstream");

        let req = self
            .client
            .post(url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body);
        let text = self.execute(req, path).await?;

        if text.trim().is_empty() {
            return Ok(json!({ "ok": true }));
        }
        serde_json::from_str(&text).map_err(|e| ExchangeError::Decode(e.to_string()))
    }
}
