use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::config::StorageConfig;
use crate::state::ObjectStore;

#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    #[tracing::instrument(level = "debug", skip(cfg), fields(bucket = %cfg.bucket))]
    pub async fn new(cfg: &StorageConfig) -> Self {
        let creds = Credentials::new(
            cfg.access_key_id.clone(),
            cfg.secret_access_key.clone(),
            None,
            None,
            "publish_notifier_static",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(creds);

        if let Some(endpoint) = &cfg.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let shared = loader.load().await;
        let mut s3_cfg = aws_sdk_s3::config::Builder::from(&shared);
        if cfg.endpoint.is_some() {
            // MinIO and friends rarely do virtual-hosted buckets
            s3_cfg = s3_cfg.force_path_style(true);
        }

        Self {
            client: Client::from_conf(s3_cfg.build()),
            bucket: cfg.bucket.clone(),
        }
    }

    fn validate_key(key: &str) -> Result<()> {
        if key.trim().is_empty() {
            return Err(anyhow!("object key is empty"));
        }
        if key.starts_with('/') || key.split('/').any(|seg| seg == "..") {
            return Err(anyhow!("object key {key:?} must be relative without '..'"));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Self::validate_key(key)?;
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        let resp = match resp {
            Ok(r) => r,
            Err(e) => {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    return Ok(None);
                }
                return Err(anyhow::Error::new(e))
                    .with_context(|| format!("s3 get_object {}/{key}", self.bucket));
            }
        };

        let data = resp
            .body
            .collect()
            .await
            .context("s3 collect body")?
            .into_bytes();
        Ok(Some(data.to_vec()))
    }

    #[tracing::instrument(level = "debug", skip(self, body), fields(len = body.len()))]
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()> {
        Self::validate_key(key)?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(anyhow::Error::new)
            .with_context(|| format!("s3 put_object {}/{key}", self.bucket))?;
        Ok(())
    }
}
