use super::{ContentStore, StoreError};
use crate::config::KvConfig;
use crate::content::ContentDocument;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const BACKEND: &str = "kv";

/// Response envelope of the key-value REST API.
#[derive(Debug, Deserialize)]
struct KvResponse {
    result: Option<serde_json::Value>,
}

/// Hosted key-value store holding the whole document under one key.
///
/// Speaks the Redis-over-REST protocol: `GET {url}/get/{key}` returns
/// `{"result": "<string>" | null}` and `POST {url}/set/{key}` stores the
/// request body as the value. Requests carry a bearer token.
pub struct KvStore {
    client: reqwest::Client,
    config: KvConfig,
}

impl KvStore {
    pub fn new(config: KvConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn http_error(source: reqwest::Error) -> StoreError {
        StoreError::Http {
            backend: BACKEND,
            source,
        }
    }

    /// `{url}/{command}/{key}` with the key as a single encoded segment.
    fn endpoint(&self, command: &str) -> Result<reqwest::Url, StoreError> {
        let invalid = || StoreError::InvalidUrl {
            backend: BACKEND,
            url: self.config.url.clone(),
        };
        let mut url = reqwest::Url::parse(&self.config.url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push(command)
            .push(&self.config.key);
        Ok(url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Backend {
            backend: BACKEND,
            status,
            body,
        })
    }
}

#[async_trait]
impl ContentStore for KvStore {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn read(&self) -> Result<Option<ContentDocument>, StoreError> {
        let url = self.endpoint("get")?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.token)
            .send()
            .await
            .map_err(Self::http_error)?;
        let response = Self::check(response).await?;

        let envelope: KvResponse = response.json().await.map_err(Self::http_error)?;

        // Values are stored as JSON text; tolerate stores that hand back the object itself.
        let value = match envelope.result {
            None | Some(serde_json::Value::Null) => return Ok(None),
            Some(serde_json::Value::String(text)) => serde_json::from_str(&text)?,
            Some(other) => other,
        };

        debug!("Read content from {}", BACKEND);
        Ok(Some(ContentDocument::from_value(value)?))
    }

    async fn write(&self, document: &ContentDocument) -> Result<(), StoreError> {
        let url = self.endpoint("set")?;
        let body = serde_json::to_string(document)?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.token)
            .body(body)
            .send()
            .await
            .map_err(Self::http_error)?;
        Self::check(response).await?;

        debug!("Wrote content to {}", BACKEND);
        Ok(())
    }
}
