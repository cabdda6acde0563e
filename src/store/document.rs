use super::{ContentStore, StoreError};
use crate::config::DocumentDbConfig;
use crate::content::{ContentDocument, Language};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

const BACKEND: &str = "document-db";

/// One stored item per language.
#[derive(Debug, Serialize, Deserialize)]
struct LanguageItem {
    #[serde(rename = "_id")]
    id: String,
    language: String,
    #[serde(default)]
    data: Value,
    #[serde(rename = "lastUpdated", default)]
    last_updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FindOneResponse {
    document: Option<LanguageItem>,
}

/// Document database reached through a REST data API.
///
/// Each language tree is its own document keyed by the language code, so
/// the two trees are read and upserted independently.
pub struct DocumentStore {
    client: reqwest::Client,
    config: DocumentDbConfig,
}

impl DocumentStore {
    pub fn new(config: DocumentDbConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn action(&self, action: &str, mut body: Value) -> Result<reqwest::Response, StoreError> {
        if let Value::Object(map) = &mut body {
            map.insert("dataSource".into(), json!(self.config.data_source));
            map.insert("database".into(), json!(self.config.database));
            map.insert("collection".into(), json!(self.config.collection));
        }

        let response = self
            .client
            .post(format!("{}/action/{}", self.config.url, action))
            .header("api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|source| StoreError::Http {
                backend: BACKEND,
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Backend {
                backend: BACKEND,
                status,
                body,
            });
        }

        Ok(response)
    }

    async fn read_language(&self, language: Language) -> Result<Option<Value>, StoreError> {
        let response = self
            .action("findOne", json!({ "filter": { "_id": language.code() } }))
            .await?;
        let found: FindOneResponse = response.json().await.map_err(|source| StoreError::Http {
            backend: BACKEND,
            source,
        })?;

        Ok(found.document.map(|item| item.data))
    }

    async fn write_language(
        &self,
        language: Language,
        tree: &Value,
        timestamp: &str,
    ) -> Result<(), StoreError> {
        let item = LanguageItem {
            id: language.code().to_string(),
            language: language.code().to_string(),
            data: tree.clone(),
            last_updated: Some(timestamp.to_string()),
        };

        self.action(
            "updateOne",
            json!({
                "filter": { "_id": language.code() },
                "update": { "$set": item },
                "upsert": true
            }),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ContentStore for DocumentStore {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn read(&self) -> Result<Option<ContentDocument>, StoreError> {
        let (jp, vn) = futures::try_join!(
            self.read_language(Language::Japanese),
            self.read_language(Language::Vietnamese),
        )?;

        if jp.is_none() && vn.is_none() {
            return Ok(None);
        }

        // A language without a stored item reads as an empty tree.
        let tree = |data: Option<Value>, language: Language| match data {
            Some(Value::Object(map)) => map,
            Some(_) | None => {
                info!("{} content not found in {}, using empty tree", language, BACKEND);
                Map::new()
            }
        };

        debug!("Read content from {}", BACKEND);
        Ok(Some(ContentDocument::new(
            tree(jp, Language::Japanese),
            tree(vn, Language::Vietnamese),
        )))
    }

    async fn write(&self, document: &ContentDocument) -> Result<(), StoreError> {
        let timestamp = Utc::now().to_rfc3339();

        futures::try_join!(
            self.write_language(Language::Japanese, document.tree(Language::Japanese), &timestamp),
            self.write_language(Language::Vietnamese, document.tree(Language::Vietnamese), &timestamp),
        )?;

        debug!("Wrote content to {}", BACKEND);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_partial_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn create_test_store(server: &MockServer) -> DocumentStore {
        DocumentStore::new(DocumentDbConfig {
            url: server.uri(),
            api_key: "test-api-key".to_string(),
            data_source: "Cluster0".to_string(),
            database: "ContentDB".to_string(),
            collection: "content".to_string(),
        })
    }

    async fn mount_find(server: &MockServer, code: &str, document: Value) {
        Mock::given(method("POST"))
            .and(path("/action/findOne"))
            .and(body_partial_json(json!({ "filter": { "_id": code } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "document": document })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_read_both_languages() {
        let mock_server = MockServer::start().await;
        mount_find(
            &mock_server,
            "jp",
            json!({ "_id": "jp", "language": "jp", "data": { "hero": { "title": "日本" } } }),
        )
        .await;
        mount_find(
            &mock_server,
            "vn",
            json!({ "_id": "vn", "language": "vn", "data": { "hero": { "title": "Việt" } } }),
        )
        .await;

        let store = create_test_store(&mock_server);
        let loaded = store.read().await.unwrap().expect("document");

        assert_eq!(loaded.get("jp.hero.title", json!("")), json!("日本"));
        assert_eq!(loaded.get("vn.hero.title", json!("")), json!("Việt"));
    }

    #[tokio::test]
    async fn test_read_missing_language_is_empty_tree() {
        let mock_server = MockServer::start().await;
        mount_find(
            &mock_server,
            "jp",
            json!({ "_id": "jp", "language": "jp", "data": { "hero": {} } }),
        )
        .await;
        mount_find(&mock_server, "vn", Value::Null).await;

        let store = create_test_store(&mock_server);
        let loaded = store.read().await.unwrap().expect("document");
        assert_eq!(loaded.tree(Language::Vietnamese), &json!({}));
    }

    #[tokio::test]
    async fn test_read_nothing_stored() {
        let mock_server = MockServer::start().await;
        mount_find(&mock_server, "jp", Value::Null).await;
        mount_find(&mock_server, "vn", Value::Null).await;

        let store = create_test_store(&mock_server);
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_upserts_each_language() {
        let mock_server = MockServer::start().await;

        for code in ["jp", "vn"] {
            Mock::given(method("POST"))
                .and(path("/action/updateOne"))
                .and(header("api-key", "test-api-key"))
                .and(body_partial_json(json!({
                    "database": "ContentDB",
                    "collection": "content",
                    "filter": { "_id": code },
                    "upsert": true,
                    "update": { "$set": { "_id": code, "language": code } }
                })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "matchedCount": 1, "modifiedCount": 1
                })))
                .expect(1)
                .mount(&mock_server)
                .await;
        }

        let store = create_test_store(&mock_server);
        store
            .write(&crate::content::defaults::default_document())
            .await
            .expect("write");
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&mock_server)
            .await;

        let store = create_test_store(&mock_server);
        let err = store
            .write(&crate::content::defaults::default_document())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend { status: 503, .. }));
    }
}
