// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::search::{ContentRecord, DocumentId};
use crate::models::storage::CompressionType;
use crate::services::stores::ContentStore;
use anyhow::{anyhow, Result};
use flate2::read::GzDecoder;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt, TryStreamExt};
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::Bucket;
use s3::Region;
use std::io::Read;

/// Concurrent object GETs issued for one page of ids
const CONTENT_FETCH_CONCURRENCY: usize = 16;

/// Configuration for S3-compatible storage
#[derive(Debug, Clone)]
pub struct S3Config {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    /// Key prefix of content objects; the object key is `{prefix}{document_id}`
    pub prefix: String,
}

impl S3Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var("S3_ENDPOINT")
            .map_err(|_| anyhow!("S3_ENDPOINT environment variable not set"))?;
        let bucket = std::env::var("S3_BUCKET")
            .map_err(|_| anyhow!("S3_BUCKET environment variable not set"))?;
        let access_key = std::env::var("S3_ACCESS_KEY")
            .map_err(|_| anyhow!("S3_ACCESS_KEY environment variable not set"))?;
        let secret_key = std::env::var("S3_SECRET_KEY")
            .map_err(|_| anyhow!("S3_SECRET_KEY environment variable not set"))?;

        let region = std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        let prefix = std::env::var("S3_CONTENT_PREFIX").unwrap_or_else(|_| "content/".to_string());

        Ok(Self {
            endpoint,
            region,
            bucket,
            access_key,
            secret_key,
            prefix,
        })
    }
}

/// Content store holding one object per document body, plain or gzip
pub struct S3ContentStore {
    bucket: Box<Bucket>,
    prefix: String,
}

impl S3ContentStore {
    /// Create a new S3 storage client
    pub fn new(config: &S3Config) -> Result<Self> {
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| anyhow!("Failed to create S3 credentials: {}", e))?;

        let bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| anyhow!("Failed to create S3 bucket: {}", e))?
            .with_path_style();

        tracing::info!(
            endpoint = %config.endpoint,
            bucket = %config.bucket,
            prefix = %config.prefix,
            "content store bucket configured"
        );

        Ok(Self {
            bucket,
            prefix: config.prefix.clone(),
        })
    }

    fn object_key(&self, document_id: &str) -> String {
        format!("{}{}", self.prefix, document_id)
    }

    /// Body of one document; `None` when no object exists for it
    async fn fetch_one(&self, document_id: &DocumentId) -> Result<Option<ContentRecord>> {
        let key = self.object_key(document_id);

        let response = match self.bucket.get_object(&key).await {
            Ok(response) => response,
            Err(S3Error::HttpFailWithBody(404, _)) => return Ok(None),
            Err(e) => return Err(anyhow!("Failed to get object {} from S3: {}", key, e)),
        };

        match response.status_code() {
            404 => Ok(None),
            status if status >= 300 => Err(anyhow!("S3 returned {} for object {}", status, key)),
            _ => Ok(content_record(document_id, response.bytes())),
        }
    }
}

/// Record for one object body. A body that cannot be decoded counts as absent
/// content for that document only; the store itself is still healthy.
pub fn content_record(document_id: &DocumentId, data: &[u8]) -> Option<ContentRecord> {
    match decode_body(data) {
        Ok(content) => Some(ContentRecord {
            document_id: document_id.clone(),
            content,
        }),
        Err(e) => {
            tracing::warn!(
                document_id = %document_id,
                compression = %CompressionType::detect(data),
                error = %e,
                "skipping undecodable content object"
            );
            None
        }
    }
}

/// Turn a stored object into text, inflating gzip payloads.
/// Bytes that are not UTF-8 are replaced, so only a broken gzip stream fails.
pub fn decode_body(data: &[u8]) -> Result<String> {
    match CompressionType::detect(data) {
        CompressionType::Gzip => {
            let mut decoder = GzDecoder::new(data);
            let mut decompressed = Vec::new();
            decoder
                .read_to_end(&mut decompressed)
                .map_err(|e| anyhow!("Failed to decompress content: {}", e))?;
            Ok(String::from_utf8_lossy(&decompressed).into_owned())
        }
        CompressionType::None => Ok(String::from_utf8_lossy(data).into_owned()),
    }
}

impl ContentStore for S3ContentStore {
    fn fetch_content<'a>(
        &'a self,
        ids: &'a [DocumentId],
    ) -> BoxFuture<'a, Result<Vec<ContentRecord>>> {
        Box::pin(async move {
            let fetches: Vec<_> = ids.iter().map(|id| self.fetch_one(id)).collect();
            let found: Vec<Option<ContentRecord>> = stream::iter(fetches)
                .buffered(CONTENT_FETCH_CONCURRENCY)
                .try_collect()
                .await?;

            Ok(found.into_iter().flatten().collect())
        })
    }

    fn count_content(&self) -> BoxFuture<'_, Result<u64>> {
        Box::pin(async move {
            let pages = self
                .bucket
                .list(self.prefix.clone(), None)
                .await
                .map_err(|e| anyhow!("Failed to list content objects: {}", e))?;

            Ok(pages.iter().map(|page| page.contents.len() as u64).sum())
        })
    }

    fn ping(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let (_, status) = self
                .bucket
                .list_page(self.prefix.clone(), None, None, None, Some(1))
                .await
                .map_err(|e| anyhow!("Content store ping failed: {}", e))?;

            if status >= 300 {
                return Err(anyhow!("Content store ping returned {}", status));
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    fn config() -> S3Config {
        S3Config {
            endpoint: "http://127.0.0.1:9000".to_string(),
            region: "us-east-1".to_string(),
            bucket: "content".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            prefix: "content/".to_string(),
        }
    }

    #[test]
    fn test_decode_plain_body() {
        assert_eq!(decode_body(b"plain text body").unwrap(), "plain text body");
    }

    #[test]
    fn test_decode_gzip_body() {
        let original = "Hello, World! ".repeat(100);
        assert_eq!(decode_body(&gzip(&original)).unwrap(), original);
    }

    #[test]
    fn test_decode_latin1_body_lossily() {
        // "café" in ISO-8859-1
        let body = decode_body(&[b'c', b'a', b'f', 0xe9]).unwrap();
        assert_eq!(body, "caf\u{fffd}");
    }

    #[test]
    fn test_decode_gzip_with_invalid_utf8_lossily() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&[b'o', b'k', 0xff]).unwrap();
        let data = encoder.finish().unwrap();

        assert_eq!(decode_body(&data).unwrap(), "ok\u{fffd}");
    }

    #[test]
    fn test_bad_body_only_drops_its_own_record() {
        let mut truncated = gzip("some body that will be cut short");
        truncated.truncate(12);
        let gzipped = gzip("compressed body");
        let bodies: Vec<(String, Vec<u8>)> = vec![
            ("plain".to_string(), b"plain body".to_vec()),
            ("truncated".to_string(), truncated),
            ("latin1".to_string(), vec![0xe9, b't', 0xe9]),
            ("gzipped".to_string(), gzipped),
        ];

        let records: Vec<ContentRecord> = bodies
            .iter()
            .filter_map(|(id, data)| content_record(id, data))
            .collect();

        let ids: Vec<&str> = records.iter().map(|r| r.document_id.as_str()).collect();
        assert_eq!(ids, vec!["plain", "latin1", "gzipped"]);
        assert_eq!(records[0].content, "plain body");
        assert_eq!(records[2].content, "compressed body");
    }

    #[test]
    fn test_decode_rejects_truncated_gzip() {
        let mut data = gzip("some body that will be cut short");
        data.truncate(12);
        assert!(decode_body(&data).is_err());
    }

    #[test]
    fn test_object_key_uses_prefix() {
        let store = S3ContentStore::new(&config()).unwrap();
        assert_eq!(store.object_key("doc-42"), "content/doc-42");
    }

    #[tokio::test]
    #[ignore] // Requires MinIO running
    async fn test_fetch_content_live() {
        let config = S3Config::from_env().unwrap();
        let store = S3ContentStore::new(&config).unwrap();

        let body = "<html><body>Test content</body></html>";
        store
            .bucket
            .put_object_with_content_type(
                &store.object_key("live-test"),
                &gzip(body),
                "application/gzip",
            )
            .await
            .unwrap();

        let ids = vec!["live-test".to_string(), "missing-doc".to_string()];
        let records = store.fetch_content(&ids).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, body);
    }
}
