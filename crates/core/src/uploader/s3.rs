//! Object-storage uploader (S3-compatible streaming PUT).
//!
//! Signs requests with AWS Signature V4 using an `UNSIGNED-PAYLOAD` content
//! hash so the body can stream from disk instead of being read twice.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Body, Client};
use sha2::{Digest, Sha256};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::ObjectStorageConfig;
use crate::progress::{ProgressEvent, ProgressReporter};

use super::error::UploadError;
use super::stream::file_stream;
use super::traits::RemoteUploader;

type HmacSha256 = Hmac<Sha256>;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60 * 60);
const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";
const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";

/// Uploader for an S3-compatible bucket; the object is expected to be
/// publicly retrievable at its virtual-hosted URL.
#[derive(Debug)]
pub struct ObjectStorageUploader {
    client: Client,
    config: ObjectStorageConfig,
}

impl ObjectStorageUploader {
    /// Creates an uploader for the configured bucket.
    pub fn new(config: ObjectStorageConfig) -> Self {
        let client = Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        Self { client, config }
    }

    fn host(&self) -> String {
        format!("{}.s3.{}.amazonaws.com", self.config.bucket, self.config.region)
    }

    /// Object key for an artifact: prefixed and timestamped so repeated
    /// uploads of the same filename never collide.
    fn object_key(&self, filename: &str) -> String {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        format!("{}/{}_{}", self.config.key_prefix, nanos, filename)
    }
}

#[async_trait]
impl RemoteUploader for ObjectStorageUploader {
    fn name(&self) -> &str {
        "object-storage"
    }

    async fn upload(
        &self,
        path: &Path,
        reporter: &ProgressReporter,
    ) -> Result<String, UploadError> {
        let size = tokio::fs::metadata(path).await?.len();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let key = self.object_key(&filename);
        let host = self.host();
        let canonical_uri = encode_key(&key);
        let target = format!("https://{}{}", host, canonical_uri);

        let now = Utc::now();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let authorization = sign_put(
            &self.config.access_key,
            &self.config.secret_key,
            &self.config.region,
            &host,
            &canonical_uri,
            &amz_date,
            &date,
        );

        let (count_tx, mut count_rx) = mpsc::unbounded_channel();
        let drain = tokio::spawn({
            let reporter = reporter.clone();
            async move {
                while let Some(sent) = count_rx.recv().await {
                    reporter.report(ProgressEvent::uploading(sent, Some(size))).await;
                }
            }
        });

        debug!("Uploading {:?} ({} bytes) to s3://{}/{}", path, size, self.config.bucket, key);
        let file = tokio::fs::File::open(path).await?;
        let response = self
            .client
            .put(&target)
            .header(CONTENT_LENGTH, size)
            .header("x-amz-date", &amz_date)
            .header("x-amz-content-sha256", UNSIGNED_PAYLOAD)
            .header("authorization", authorization)
            .body(Body::wrap_stream(file_stream(file, Some(count_tx))))
            .send()
            .await
            .map_err(|e| UploadError::Http(e.to_string()))?;

        let _ = drain.await;

        let status = response.status();
        if status.is_success() {
            info!("Upload finished: {}", target);
            Ok(target)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(UploadError::rejected(self.name(), status.as_u16(), &body))
        }
    }
}

/// URI-encodes an object key for the canonical request, keeping `/` as the
/// segment separator.
fn encode_key(key: &str) -> String {
    let encoded: Vec<String> = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("/{}", encoded.join("/"))
}

/// Builds the SigV4 `Authorization` header value for a streamed PUT.
fn sign_put(
    access_key: &str,
    secret_key: &str,
    region: &str,
    host: &str,
    canonical_uri: &str,
    amz_date: &str,
    date: &str,
) -> String {
    let canonical_request = format!(
        "PUT\n{}\n\nhost:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n\n{}\n{}",
        canonical_uri, host, UNSIGNED_PAYLOAD, amz_date, SIGNED_HEADERS, UNSIGNED_PAYLOAD,
    );
    let scope = format!("{}/{}/s3/aws4_request", date, region);
    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{}\n{}\n{}",
        amz_date,
        scope,
        hex(&Sha256::digest(canonical_request.as_bytes())),
    );

    let date_key = hmac(format!("AWS4{}", secret_key).as_bytes(), date.as_bytes());
    let region_key = hmac(&date_key, region.as_bytes());
    let service_key = hmac(&region_key, b"s3");
    let signing_key = hmac(&service_key, b"aws4_request");
    let signature = hex(&hmac(&signing_key, string_to_sign.as_bytes()));

    format!(
        "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
        access_key, scope, SIGNED_HEADERS, signature,
    )
}

fn hmac(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
