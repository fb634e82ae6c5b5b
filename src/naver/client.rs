// src/naver/client.rs
use crate::utils::error::NaverError;
use reqwest::StatusCode;
use std::time::Duration;

/// Item main page carrying the market summary and the corporate-analysis table.
pub const ITEM_MAIN_URL: &str = "https://finance.naver.com/item/main.naver";
// The portal serves a stripped page to clients that do not look like a browser.
const PORTAL_USER_AGENT: &str = "Mozilla/5.0";
const PORTAL_REFERER: &str = "http://naver.com";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Status plus body. The body is only kept for success statuses.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: StatusCode,
    pub body: Option<String>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success() && self.body.is_some()
    }
}

/// Fetches documents over HTTP. Implementations must not retry.
#[allow(async_fn_in_trait)]
pub trait DocumentFetcher {
    async fn fetch(
        &self,
        url: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<FetchResponse, NaverError>;
}

/// `reqwest`-backed fetcher.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, NaverError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }
}

impl DocumentFetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<FetchResponse, NaverError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| NaverError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let mut request = self.client.get(parsed).query(query);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?; // Propagates reqwest::Error as NaverError::Network

        let status = response.status();
        tracing::debug!("response status code: {} for {}", status, url);
        if !status.is_success() {
            tracing::warn!("HTTP error status: {} for URL: {}", status, url);
            return Ok(FetchResponse { status, body: None });
        }

        // reqwest decodes using the charset in Content-Type (the portal serves EUC-KR)
        let body = response.text().await?;
        tracing::debug!("Successfully downloaded {} bytes from {}", body.len(), url);

        Ok(FetchResponse { status, body: Some(body) })
    }
}

/// Requests the item main page of `stock_code`.
pub async fn fetch_item_page<F: DocumentFetcher>(
    fetcher: &F,
    stock_code: &str,
) -> Result<FetchResponse, NaverError> {
    tracing::info!("Scrap naver page for stock code {}", stock_code);
    fetcher
        .fetch(
            ITEM_MAIN_URL,
            &[("code", stock_code)],
            &[("User-Agent", PORTAL_USER_AGENT), ("referer", PORTAL_REFERER)],
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct RecordingFetcher {
        calls: RefCell<Vec<(String, Vec<(String, String)>, Vec<(String, String)>)>>,
    }

    impl DocumentFetcher for RecordingFetcher {
        async fn fetch(
            &self,
            url: &str,
            query: &[(&str, &str)],
            headers: &[(&str, &str)],
        ) -> Result<FetchResponse, NaverError> {
            fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
                pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
            }
            self.calls
                .borrow_mut()
                .push((url.to_string(), owned(query), owned(headers)));
            Ok(FetchResponse { status: StatusCode::NOT_FOUND, body: None })
        }
    }

    #[test]
    fn test_item_page_request_shape() {
        let fetcher = RecordingFetcher { calls: RefCell::new(Vec::new()) };
        let response = tokio_test::block_on(fetch_item_page(&fetcher, "005930")).unwrap();

        assert!(!response.is_success());
        let calls = fetcher.calls.borrow();
        assert_eq!(calls.len(), 1);
        let (url, query, headers) = &calls[0];
        assert_eq!(url, ITEM_MAIN_URL);
        assert_eq!(query, &vec![("code".to_string(), "005930".to_string())]);
        assert!(headers.contains(&("referer".to_string(), "http://naver.com".to_string())));
        assert!(headers.iter().any(|(k, _)| k == "User-Agent"));
    }

    #[tokio::test]
    async fn test_invalid_url_is_reported() {
        let fetcher = HttpFetcher::new().unwrap();
        let result = fetcher.fetch("not a url", &[], &[]).await;
        assert!(matches!(result, Err(NaverError::InvalidUrl { .. })));
    }

    #[tokio::test]
    #[ignore] // Hits the live portal
    async fn test_fetch_samsung_page() {
        let fetcher = HttpFetcher::new().unwrap();
        let response = fetch_item_page(&fetcher, "005930").await.unwrap();
        assert!(response.is_success());
        assert!(response.body.unwrap().contains("cop_analysis"));
    }
}
