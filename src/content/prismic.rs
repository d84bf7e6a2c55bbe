//! HTTP client for a Prismic-style REST API (v2).
//!
//! Every search needs a content ref: the client first asks the API root for
//! the master ref, then issues `documents/search` requests against it.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::query::{ContentSource, Filter, MAX_PAGE_SIZE, Query};
use crate::error::{ArdoiseError, Result};

#[derive(Debug, Deserialize)]
struct ApiRoot {
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Value>,
}

/// Client for `https://<repo>.cdn.prismic.io/api/v2`.
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
}

impl PrismicClient {
    pub fn new(endpoint: &str, access_token: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("ardoise/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ArdoiseError::Query(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let mut request = self.http.get(url).query(params);
        if let Some(token) = &self.access_token {
            request = request.query(&[("access_token", token)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ArdoiseError::Query(format!("Request to {} failed: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(ArdoiseError::Query(format!(
                "Request to {} failed: HTTP {}",
                url,
                response.status()
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ArdoiseError::Query(format!("Invalid response from {}: {}", url, e)))
    }

    async fn master_ref(&self) -> Result<String> {
        let root: ApiRoot = self.get_json(&self.endpoint, &[]).await?;
        root.refs
            .into_iter()
            .find(|r| r.is_master)
            .map(|r| r.reference)
            .ok_or_else(|| ArdoiseError::Query("API root has no master ref".to_string()))
    }

    async fn search(&self, query: &Query) -> Result<Vec<Value>> {
        let master = self.master_ref().await?;
        let mut params = vec![
            ("ref", master),
            ("q", query.predicates()),
            ("pageSize", query.page_size.to_string()),
        ];
        if let Some(orderings) = query.orderings_param() {
            params.push(("orderings", orderings));
        }

        let url = format!("{}/documents/search", self.endpoint);
        let response: SearchResponse = self.get_json(&url, &params).await?;
        Ok(response.results)
    }
}

#[async_trait]
impl ContentSource for PrismicClient {
    async fn query(&self, query: &Query) -> Result<Vec<Value>> {
        self.search(query).await
    }

    async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<Value>> {
        let mut documents = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_PAGE_SIZE) {
            let query = Query::default()
                .filter(Filter::any("document.id", chunk))
                .page_size(chunk.len());
            documents.extend(self.search(&query).await?);
        }
        Ok(documents)
    }
}
