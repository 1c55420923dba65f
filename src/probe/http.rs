use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use tracing::debug;

use super::{Attempt, Fetch};
use crate::error::Result;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub(crate) fn defaults_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(3);

    // advertises that this client can handle `text/html`, `application/xhtml+xml`, and `application/xml`, etc.,
    // with a preference for `text/html` and `application/xhtml+xml`.
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.8"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

    headers
}

/// [`Fetch`] over a shared `reqwest` client.
///
/// Redirects are followed and certificate errors are ignored: a host serving a
/// self-signed certificate is still a host that answers.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .default_headers(defaults_headers())
            .user_agent(USER_AGENT)
            .gzip(true)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: String, timeout: Duration) -> Attempt {
        match self.client.get(&url).timeout(timeout).send().await {
            Ok(resp) => Attempt::Responded(resp.status()),
            Err(e) if e.is_timeout() => Attempt::TimedOut,
            Err(e) => {
                debug!(%url, error = %e, "request failed");
                Attempt::Unreachable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::time::Instant;

    use reqwest::StatusCode;
    use rstest::rstest;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(500);

    #[rstest]
    #[case::ok(200)]
    #[case::moved(301)]
    #[case::not_found(404)]
    #[case::server_error(503)]
    #[tokio::test]
    async fn test_fetch_reports_status(#[case] code: u16) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(code))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let attempt = fetcher.fetch(server.uri(), TIMEOUT).await;

        // redirects without a location header are returned as-is
        assert_eq!(
            attempt,
            Attempt::Responded(StatusCode::from_u16(code).unwrap())
        );
    }

    #[tokio::test]
    async fn test_fetch_follows_redirect() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::path("/"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/home"))
            .mount(&server)
            .await;
        Mock::given(wiremock::matchers::path("/home"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let attempt = fetcher.fetch(server.uri(), TIMEOUT).await;

        assert_eq!(attempt, Attempt::Responded(StatusCode::OK));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let start = Instant::now();
        let attempt = fetcher.fetch(server.uri(), Duration::from_millis(200)).await;

        assert_eq!(attempt, Attempt::TimedOut);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_fetch_closed_port_is_unreachable() {
        // grab a free port, then release it so nothing is listening
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let fetcher = HttpFetcher::new().unwrap();
        let attempt = fetcher
            .fetch(format!("http://127.0.0.1:{port}"), TIMEOUT)
            .await;

        assert_eq!(attempt, Attempt::Unreachable);
    }
}
