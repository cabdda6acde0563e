use anyhow::{bail, Result};
use std::path::PathBuf;

/// Selects the fallback behaviour of the content and media services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Development,
    Production,
}

impl ExecutionMode {
    /// Anything other than `production` (case-insensitive) is development.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("production") => ExecutionMode::Production,
            _ => ExecutionMode::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, ExecutionMode::Production)
    }
}

/// Hosted key-value store (REST protocol).
#[derive(Debug, Clone)]
pub struct KvConfig {
    pub url: String,
    pub token: String,
    pub key: String,
}

/// Document database reached through its REST data API.
#[derive(Debug, Clone)]
pub struct DocumentDbConfig {
    pub url: String,
    pub api_key: String,
    pub data_source: String,
    pub database: String,
    pub collection: String,
}

/// Digest used to sign hosted media uploads. Accounts validate SHA-1 unless
/// switched over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl SignatureAlgorithm {
    pub fn from_env_value(value: Option<&str>) -> Result<Self> {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("sha1") => Ok(SignatureAlgorithm::Sha1),
            Some("sha256") => Ok(SignatureAlgorithm::Sha256),
            Some(other) => bail!("Unsupported CLOUDINARY_SIGNATURE_ALGORITHM: {}", other),
        }
    }
}

/// Hosted media service credentials.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base: String,
    pub signature_algorithm: SignatureAlgorithm,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mode: ExecutionMode,
    pub port: u16,

    // Content persistence
    pub content_file: PathBuf,
    pub kv: Option<KvConfig>,
    pub document_db: Option<DocumentDbConfig>,

    // Media
    pub upload_dir: PathBuf,
    pub upload_public_prefix: String,
    pub cloudinary: Option<CloudinaryConfig>,

    // Admin
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mode = ExecutionMode::from_env_value(
            var("APP_ENV").or_else(|| var("NODE_ENV")).as_deref(),
        );

        let kv = match (var("KV_REST_API_URL"), var("KV_REST_API_TOKEN")) {
            (Some(url), Some(token)) => Some(KvConfig {
                url: url.trim_end_matches('/').to_string(),
                token,
                key: var("KV_CONTENT_KEY").unwrap_or_else(|| "site-content".to_string()),
            }),
            (None, None) => None,
            _ => bail!("KV_REST_API_URL and KV_REST_API_TOKEN must be set together"),
        };

        let document_db = match (var("DOCUMENT_DB_URL"), var("DOCUMENT_DB_API_KEY")) {
            (Some(url), Some(api_key)) => Some(DocumentDbConfig {
                url: url.trim_end_matches('/').to_string(),
                api_key,
                data_source: var("DOCUMENT_DB_DATA_SOURCE")
                    .unwrap_or_else(|| "Cluster0".to_string()),
                database: var("DOCUMENT_DB_DATABASE").unwrap_or_else(|| "ContentDB".to_string()),
                collection: var("DOCUMENT_DB_COLLECTION").unwrap_or_else(|| "content".to_string()),
            }),
            (None, None) => None,
            _ => bail!("DOCUMENT_DB_URL and DOCUMENT_DB_API_KEY must be set together"),
        };

        // All three credentials are needed; a partial set falls back to local storage.
        let cloudinary = match (
            var("CLOUDINARY_CLOUD_NAME"),
            var("CLOUDINARY_API_KEY"),
            var("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret,
                api_base: var("CLOUDINARY_API_BASE")
                    .map(|v| v.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| "https://api.cloudinary.com".to_string()),
                signature_algorithm: SignatureAlgorithm::from_env_value(
                    var("CLOUDINARY_SIGNATURE_ALGORITHM").as_deref(),
                )?,
            }),
            _ => None,
        };

        Ok(Self {
            mode,
            port: var("PORT").and_then(|v| v.parse().ok()).unwrap_or(8080),

            content_file: var("CONTENT_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/content.json")),
            kv,
            document_db,

            upload_dir: var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public/slides")),
            upload_public_prefix: var("UPLOAD_PUBLIC_PREFIX")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "/slides".to_string()),
            cloudinary,

            admin_password: var("ADMIN_PASSWORD"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    // ==================== Defaults ====================

    #[test]
    fn test_defaults_with_empty_environment() {
        let config = Config::from_lookup(lookup_from(&[])).expect("config");

        assert_eq!(config.mode, ExecutionMode::Development);
        assert_eq!(config.port, 8080);
        assert_eq!(config.content_file, PathBuf::from("data/content.json"));
        assert_eq!(config.upload_dir, PathBuf::from("public/slides"));
        assert_eq!(config.upload_public_prefix, "/slides");
        assert!(config.kv.is_none());
        assert!(config.document_db.is_none());
        assert!(config.cloudinary.is_none());
        assert!(config.admin_password.is_none());
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let config = Config::from_lookup(lookup_from(&[("PORT", "not-a-port")])).unwrap();
        assert_eq!(config.port, 8080);
    }

    // ==================== Execution Mode ====================

    #[test]
    fn test_execution_mode_parsing() {
        assert_eq!(
            ExecutionMode::from_env_value(Some("production")),
            ExecutionMode::Production
        );
        assert_eq!(
            ExecutionMode::from_env_value(Some(" Production ")),
            ExecutionMode::Production
        );
        assert_eq!(
            ExecutionMode::from_env_value(Some("development")),
            ExecutionMode::Development
        );
        assert_eq!(ExecutionMode::from_env_value(None), ExecutionMode::Development);
    }

    #[test]
    fn test_app_env_takes_precedence_over_node_env() {
        let config = Config::from_lookup(lookup_from(&[
            ("APP_ENV", "development"),
            ("NODE_ENV", "production"),
        ]))
        .unwrap();
        assert_eq!(config.mode, ExecutionMode::Development);

        let config = Config::from_lookup(lookup_from(&[("NODE_ENV", "production")])).unwrap();
        assert!(config.mode.is_production());
    }

    // ==================== Backends ====================

    #[test]
    fn test_kv_requires_url_and_token() {
        let result = Config::from_lookup(lookup_from(&[("KV_REST_API_URL", "https://kv.test")]));
        assert!(result.is_err());

        let config = Config::from_lookup(lookup_from(&[
            ("KV_REST_API_URL", "https://kv.test/"),
            ("KV_REST_API_TOKEN", "token"),
        ]))
        .unwrap();
        let kv = config.kv.expect("kv configured");
        assert_eq!(kv.url, "https://kv.test");
        assert_eq!(kv.key, "site-content");
    }

    #[test]
    fn test_document_db_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DOCUMENT_DB_URL", "https://data.test/app/v1"),
            ("DOCUMENT_DB_API_KEY", "key"),
        ]))
        .unwrap();
        let db = config.document_db.expect("document db configured");
        assert_eq!(db.database, "ContentDB");
        assert_eq!(db.collection, "content");
        assert_eq!(db.data_source, "Cluster0");
    }

    #[test]
    fn test_document_db_half_configured_is_error() {
        let result = Config::from_lookup(lookup_from(&[("DOCUMENT_DB_API_KEY", "key")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_cloudinary_needs_all_credentials() {
        let partial = Config::from_lookup(lookup_from(&[
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "key"),
        ]))
        .unwrap();
        assert!(partial.cloudinary.is_none());

        let full = Config::from_lookup(lookup_from(&[
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "key"),
            ("CLOUDINARY_API_SECRET", "secret"),
        ]))
        .unwrap();
        let cloudinary = full.cloudinary.expect("cloudinary configured");
        assert_eq!(cloudinary.api_base, "https://api.cloudinary.com");
        assert_eq!(cloudinary.signature_algorithm, SignatureAlgorithm::Sha1);
    }

    #[test]
    fn test_cloudinary_signature_algorithm() {
        let credentials = [
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "key"),
            ("CLOUDINARY_API_SECRET", "secret"),
        ];

        let mut pairs = credentials.to_vec();
        pairs.push(("CLOUDINARY_SIGNATURE_ALGORITHM", "SHA256"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(
            config.cloudinary.unwrap().signature_algorithm,
            SignatureAlgorithm::Sha256
        );

        let mut pairs = credentials.to_vec();
        pairs.push(("CLOUDINARY_SIGNATURE_ALGORITHM", "md5"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = Config::from_lookup(lookup_from(&[("ADMIN_PASSWORD", "  ")])).unwrap();
        assert!(config.admin_password.is_none());
    }

    // ==================== Process Environment ====================

    #[test]
    #[serial]
    fn test_from_env_reads_process_environment() {
        std::env::set_var("PORT", "9191");
        std::env::set_var("CONTENT_FILE", "/tmp/fsg-content-test.json");

        let config = Config::from_env().expect("config from env");

        std::env::remove_var("PORT");
        std::env::remove_var("CONTENT_FILE");

        assert_eq!(config.port, 9191);
        assert_eq!(config.content_file, PathBuf::from("/tmp/fsg-content-test.json"));
    }
}
