//! Single outbound page fetch.

use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use crate::error::FetchError;
use crate::utils::browser_headers;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into `FetchError::Status`
    pub fn into_success(self) -> Result<Self, FetchError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FetchError::Status(self.status))
        }
    }
}

/// Issues one GET and hands back whatever the server said.
/// Implementations hold no per-call state and never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

pub fn validate_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::invalid_url(url, e))?;
    if parsed.host().is_none() {
        return Err(FetchError::invalid_url(url, "missing host"));
    }
    Ok(parsed)
}

pub struct HttpDispatcher {
    client: reqwest::Client,
}

impl HttpDispatcher {
    pub fn new(timeout_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .default_headers(browser_headers())
            .timeout(Duration::from_secs(timeout_secs))
            .cookie_store(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpDispatcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let url = validate_url(url)?;

        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(FetchResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses in order and remembers every URL asked for
    #[derive(Default)]
    pub struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<FetchResponse, FetchError>>>,
        pub requested: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn ok(self, body: &str) -> Self {
            self.status(200, body)
        }

        pub fn status(self, status: u16, body: &str) -> Self {
            self.responses.lock().unwrap().push_back(Ok(FetchResponse {
                status,
                body: body.to_string(),
            }));
            self
        }

        pub fn fail(self, url: &str) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err(FetchError::invalid_url(url, "scripted failure")));
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(FetchResponse { status: 404, body: String::new() }))
        }
    }
}
