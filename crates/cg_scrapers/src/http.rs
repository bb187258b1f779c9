use async_trait::async_trait;
use cg_core::config::FeedConfig;
use cg_core::{Error, FeedRequest, FeedSource, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

const FEED_ACCEPT: &str = "application/rss+xml, application/xml;q=0.9, text/xml;q=0.8, */*;q=0.5";

/// Reads pages of a TownNews-style search feed over HTTP.
pub struct HttpFeedSource {
    client: reqwest::Client,
    endpoint: Url,
    name: String,
}

impl HttpFeedSource {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", config.endpoint, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(FEED_ACCEPT));

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let name = endpoint.host_str().unwrap_or("feed").to_string();
        Ok(Self { client, endpoint, name })
    }

    /// Search URL for one page, newest first.
    pub fn page_url(&self, request: &FeedRequest) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("f", "rss")
                .append_pair("t", "article")
                .append_pair("l", &request.limit.to_string())
                .append_pair("o", &request.offset.to_string())
                .append_pair("s", "start_time")
                .append_pair("sd", "desc");
            if let Some(days) = request.within_days {
                query.append_pair("d1", &format!("{} days ago", days));
            }
        }
        url
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_page(&self, request: &FeedRequest) -> Result<Vec<u8>> {
        let url = self.page_url(request);
        debug!(%url, "GET feed page");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited);
        }
        if !status.is_success() {
            return Err(Error::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answers a single request with a canned response and hands back the
    /// request head it saw.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 16 * 1024];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).into_owned();
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });
        (format!("http://{}/search/", addr), handle)
    }

    fn source(endpoint: String) -> HttpFeedSource {
        let config = FeedConfig {
            endpoint,
            timeout: Duration::from_secs(5),
            ..Default::default()
        };
        HttpFeedSource::new(&config).unwrap()
    }

    fn request(offset: usize) -> FeedRequest {
        FeedRequest { offset, limit: 2, within_days: None }
    }

    #[test]
    fn test_page_url() {
        let source = source("https://www.psucollegian.com/search/".to_string());
        let url = source.page_url(&FeedRequest { offset: 200, limit: 100, within_days: Some(7) });
        assert_eq!(
            url.as_str(),
            "https://www.psucollegian.com/search/?f=rss&t=article&l=100&o=200&s=start_time&sd=desc&d1=7+days+ago"
        );
        assert_eq!(source.name(), "www.psucollegian.com");
    }

    #[tokio::test]
    async fn test_fetch_page_sends_browser_user_agent() {
        let (endpoint, server) = serve_once("200 OK", "<rss><channel></channel></rss>").await;
        let body = source(endpoint).fetch_page(&request(4)).await.unwrap();
        assert_eq!(body, b"<rss><channel></channel></rss>".to_vec());

        let seen = server.await.unwrap().to_lowercase();
        assert!(seen.starts_with("get /search/?f=rss&t=article&l=2&o=4&"));
        assert!(seen.contains("user-agent: mozilla/5.0"));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let (endpoint, server) = serve_once("429 Too Many Requests", "slow down").await;
        let err = source(endpoint).fetch_page(&request(0)).await.unwrap_err();
        assert!(matches!(err, Error::RateLimited));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let (endpoint, server) = serve_once("403 Forbidden", "denied").await;
        let err = source(endpoint).fetch_page(&request(0)).await.unwrap_err();
        assert!(matches!(err, Error::HttpStatus(403)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_is_a_fetch_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = source(format!("http://{}/search/", addr))
            .fetch_page(&request(0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
