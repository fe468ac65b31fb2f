use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect, Client, Method, StatusCode};
use tracing::debug;

use super::{ProbeError, Prober};

/// HEAD-based status prober. Falls back to GET when the server rejects HEAD.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Self::build_client(timeout)?,
        })
    }

    pub fn from_config(config: &crate::config::WatchConfig) -> Result<Self, reqwest::Error> {
        Self::new(config.request_timeout)
    }

    /// Redirects are not followed so the reported status is the one the
    /// target itself returned.
    pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
        Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .redirect(redirect::Policy::none())
            .user_agent(concat!("page-watch/", env!("CARGO_PKG_VERSION")))
            .build()
    }

    async fn send(&self, method: Method, url: &str) -> Result<StatusCode, ProbeError> {
        self.client
            .request(method, url)
            .send()
            .await
            .map(|resp| resp.status())
            .map_err(|e| ProbeError::Failed {
                url: url.to_string(),
                reason: e.to_string(),
                timed_out: e.is_timeout(),
            })
    }
}

fn rejects_head(status: StatusCode) -> bool {
    status == StatusCode::METHOD_NOT_ALLOWED || status == StatusCode::NOT_IMPLEMENTED
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> Result<u16, ProbeError> {
        let status = self.send(Method::HEAD, url).await?;
        if !rejects_head(status) {
            return Ok(status.as_u16());
        }

        debug!(url, status = status.as_u16(), "HEAD rejected, retrying with GET");
        let status = self.send(Method::GET, url).await?;
        Ok(status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prober() -> HttpProber {
        HttpProber::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn probe_returns_200() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/get-started"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let status = prober()
            .probe(&format!("{}/get-started", server.uri()))
            .await
            .unwrap();
        assert_eq!(status, 200);
    }

    #[tokio::test]
    async fn probe_reports_404_as_status_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let status = prober()
            .probe(&format!("{}/missing", server.uri()))
            .await
            .unwrap();
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn probe_falls_back_to_get_when_head_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(405))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let status = prober()
            .probe(&format!("{}/page", server.uri()))
            .await
            .unwrap();
        assert_eq!(status, 200);
    }

    #[tokio::test]
    async fn not_implemented_head_falls_back_to_get() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/legacy"))
            .respond_with(ResponseTemplate::new(501))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/legacy"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let status = prober()
            .probe(&format!("{}/legacy", server.uri()))
            .await
            .unwrap();
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn probe_does_not_follow_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
            .mount(&server)
            .await;

        let status = prober()
            .probe(&format!("{}/old", server.uri()))
            .await
            .unwrap();
        assert_eq!(status, 301);
    }

    #[tokio::test]
    async fn probe_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let prober = HttpProber::new(Duration::from_millis(200)).unwrap();
        let err = prober.probe(&server.uri()).await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn probe_connection_refused_is_failure() {
        let err = prober().probe("http://127.0.0.1:9/").await.unwrap_err();
        assert!(!err.is_timeout());
        assert!(err.to_string().contains("127.0.0.1:9"));
    }
}
