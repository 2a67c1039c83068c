//! Object storage backend on the AWS SDK.
//!
//! The pipeline is sequential and blocking, so each backend owns a current-thread
//! Tokio runtime and blocks on every SDK call.

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials as SdkCredentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use super::{ObjectEntry, OutputEncoding, Storage};
use crate::config::Credentials;
use crate::error::{PrepError, PrepResult};

const CREDENTIALS_SOURCE: &str = "prep-environment";
const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// A bucket, optionally narrowed to a key prefix.
pub struct S3Storage {
    client: Client,
    runtime: Runtime,
    bucket: String,
    prefix: Option<String>,
}

impl S3Storage {
    /// Build a client for `bucket` from explicitly supplied credentials.
    pub fn connect(
        bucket: &str,
        prefix: Option<&str>,
        credentials: &Credentials,
    ) -> PrepResult<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PrepError::config("runtime", format!("tokio runtime init failed: {e}")))?;

        let provider = SdkCredentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None,
            None,
            CREDENTIALS_SOURCE,
        );
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).credentials_provider(provider);
        if let Some(region) = &credentials.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = runtime.block_on(loader.load());

        Ok(Self {
            client: Client::new(&sdk_config),
            runtime,
            bucket: bucket.to_string(),
            prefix: prefix
                .map(|p| p.trim_matches('/').to_string())
                .filter(|p| !p.is_empty()),
        })
    }

    fn full_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}/{key}"),
            None => key.to_string(),
        }
    }

    fn relative_key<'k>(&self, key: &'k str) -> &'k str {
        match &self.prefix {
            Some(prefix) => key
                .strip_prefix(prefix.as_str())
                .map(|rest| rest.trim_start_matches('/'))
                .unwrap_or(key),
            None => key,
        }
    }
}

impl Storage for S3Storage {
    fn location(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("s3://{}/{prefix}", self.bucket),
            None => format!("s3://{}", self.bucket),
        }
    }

    fn list(&self) -> PrepResult<Vec<ObjectEntry>> {
        let list_prefix = self.prefix.as_ref().map(|p| format!("{p}/"));
        let mut entries = Vec::new();
        let mut token: Option<String> = None;
        let mut pages: u64 = 0;

        self.runtime.block_on(async {
            loop {
                let mut req = self.client.list_objects_v2().bucket(&self.bucket);
                if let Some(p) = list_prefix.as_deref() {
                    req = req.prefix(p);
                }
                if let Some(t) = token.as_deref() {
                    req = req.continuation_token(t);
                }
                let resp = req.send().await.map_err(|e| {
                    PrepError::storage_list(self.location(), DisplayErrorContext(&e).to_string())
                })?;
                pages += 1;

                for obj in resp.contents() {
                    let Some(key) = obj.key() else { continue };
                    if key.ends_with('/') {
                        continue;
                    }
                    let size = obj.size().unwrap_or(0).max(0) as u64;
                    entries.push(ObjectEntry::new(self.relative_key(key), size));
                }

                match resp.next_continuation_token() {
                    Some(next) if resp.is_truncated().unwrap_or(false) => {
                        token = Some(next.to_string());
                    }
                    _ => break,
                }
            }
            Ok::<_, PrepError>(())
        })?;

        debug!(location = %self.location(), pages, objects = entries.len(), "listed bucket");
        Ok(entries)
    }

    fn fetch(&self, key: &str) -> PrepResult<Vec<u8>> {
        let full_key = self.full_key(key);
        self.runtime.block_on(async {
            let obj = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(&full_key)
                .send()
                .await
                .map_err(|e| {
                    PrepError::storage_fetch(self.location(), key, DisplayErrorContext(&e).to_string())
                })?;
            let collected = obj.body.collect().await.map_err(|e| {
                PrepError::storage_fetch(self.location(), key, format!("body read failed: {e}"))
            })?;
            Ok(collected.into_bytes().to_vec())
        })
    }

    fn put(&self, key: &str, bytes: &[u8]) -> PrepResult<()> {
        let full_key = self.full_key(key);
        self.runtime.block_on(async {
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(&full_key)
                .content_type(JPEG_CONTENT_TYPE)
                .body(ByteStream::from(bytes.to_vec()))
                .send()
                .await
                .map_err(|e| {
                    PrepError::storage_write(self.location(), key, DisplayErrorContext(&e).to_string())
                })?;
            Ok(())
        })
    }

    fn output_encoding(&self) -> OutputEncoding {
        OutputEncoding::Jpeg
    }
}
