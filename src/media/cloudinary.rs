use super::{ImageUpload, MediaStore, StoredMedia, UploadError};
use crate::config::{CloudinaryConfig, SignatureAlgorithm};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use sha2::Sha256;

const FOLDER: &str = "fsg-slides";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

/// Sign upload parameters: sorted `key=value` pairs joined by `&`, followed
/// by the API secret, hashed and hex-encoded.
pub fn sign_params(
    params: &[(&str, String)],
    api_secret: &str,
    algorithm: SignatureAlgorithm,
) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    match algorithm {
        SignatureAlgorithm::Sha1 => hex_digest::<Sha1>(&to_sign, api_secret),
        SignatureAlgorithm::Sha256 => hex_digest::<Sha256>(&to_sign, api_secret),
    }
}

fn hex_digest<D: Digest>(to_sign: &str, api_secret: &str) -> String {
    let mut hasher = D::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hosted media service upload via signed REST requests.
pub struct CloudinaryStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    fn name(&self) -> &'static str {
        "cloudinary"
    }

    async fn store(&self, upload: &ImageUpload) -> Result<StoredMedia, UploadError> {
        let now = Utc::now();
        let signed = [
            ("folder", FOLDER.to_string()),
            ("public_id", format!("slide_{}", now.timestamp_millis())),
            ("timestamp", now.timestamp().to_string()),
        ];
        let algorithm = self.config.signature_algorithm;
        let signature = sign_params(&signed, &self.config.api_secret, algorithm);

        let data_uri = format!(
            "data:{};base64,{}",
            upload.declared_mime_type,
            STANDARD.encode(&upload.bytes)
        );

        let mut form: Vec<(&str, String)> = signed.to_vec();
        form.push(("file", data_uri));
        form.push(("api_key", self.config.api_key.clone()));
        form.push(("signature", signature));
        if algorithm == SignatureAlgorithm::Sha256 {
            form.push(("signature_algorithm", "sha256".to_string()));
        }

        let url = format!(
            "{}/v1_1/{}/auto/upload",
            self.config.api_base, self.config.cloud_name
        );

        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| UploadError::Hosted(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Hosted(format!("{}: {}", status, body)));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::Hosted(e.to_string()))?;

        Ok(StoredMedia {
            url: uploaded.secure_url,
            filename: uploaded.public_id,
            hosted: true,
        })
    }
}
