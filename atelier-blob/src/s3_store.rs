use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::{primitives::ByteStream as AwsByteStream, Client};
use std::collections::BTreeMap;
use std::env;

use crate::{
    store::read_to_end, BlobInfo, BlobStore, ByteStream, GalleryError, GalleryResult, GetResult,
    PutResult,
};

/// S3-compatible endpoint configuration, read from the environment
#[derive(Debug)]
pub struct S3Config {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint_url: String,
    pub bucket: String,
}

impl S3Config {
    pub fn from_env() -> GalleryResult<Self> {
        fn get_env(key: &str) -> GalleryResult<String> {
            env::var(key)
                .map_err(|_| GalleryError::invalid(format!("{key} environment variable required")))
        }

        Ok(Self {
            region: get_env("ATELIER_S3_REGION")?,
            access_key_id: get_env("ATELIER_S3_ACCESS_KEY_ID")?,
            secret_access_key: get_env("ATELIER_S3_SECRET_ACCESS_KEY")?,
            endpoint_url: get_env("ATELIER_S3_ENDPOINT_URL")?,
            bucket: get_env("ATELIER_S3_BUCKET")?,
        })
    }
}

/// Blob store backed by any S3-compatible service (MinIO, RustFS, R2, S3)
#[derive(Clone)]
pub struct S3CompatibleStore {
    client: Client,
    bucket: String,
    endpoint_url: String,
}

impl S3CompatibleStore {
    pub async fn from_env() -> GalleryResult<Self> {
        let config = S3Config::from_env()?;
        Ok(Self::new(config).await)
    }

    pub async fn new(config: S3Config) -> Self {
        let credentials = Credentials::new(
            config.access_key_id,
            config.secret_access_key,
            None,
            None,
            "atelier",
        );

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .endpoint_url(config.endpoint_url.clone())
            .load()
            .await;

        let client = Client::from_conf(
            aws_sdk_s3::config::Builder::from(&aws_config)
                .force_path_style(true) // Required for MinIO/RustFS compatibility
                .build(),
        );

        Self {
            client,
            bucket: config.bucket,
            endpoint_url: config.endpoint_url,
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint_url.trim_end_matches('/'),
            self.bucket,
            key
        )
    }

    fn map_aws_error(err: impl std::error::Error + Send + Sync + 'static) -> GalleryError {
        GalleryError::backend(err)
    }
}

#[async_trait]
impl BlobStore for S3CompatibleStore {
    async fn put(
        &self,
        key: &str,
        content_type: Option<&str>,
        metadata: &BTreeMap<String, String>,
        stream: ByteStream,
    ) -> GalleryResult<PutResult> {
        let data = read_to_end(stream).await?;
        let size_bytes = data.len() as u64;

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(AwsByteStream::from(data));

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }
        for (name, value) in metadata {
            request = request.metadata(name, value);
        }

        let result = request.send().await.map_err(Self::map_aws_error)?;

        Ok(PutResult {
            url: self.object_url(key),
            size_bytes,
            etag: result.e_tag,
        })
    }

    async fn get(&self, key: &str) -> GalleryResult<GetResult> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(Self::map_aws_error)?;

        let content_type = result.content_type;
        let body = result.body.collect().await.map_err(Self::map_aws_error)?;
        let data = body.into_bytes();

        Ok(GetResult {
            size_bytes: data.len() as u64,
            content_type,
            stream: crate::store::stream_bytes(data),
        })
    }

    async fn delete(&self, key: &str) -> GalleryResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(Self::map_aws_error)?;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> GalleryResult<Vec<BlobInfo>> {
        let result = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .send()
            .await
            .map_err(Self::map_aws_error)?;

        let mut blobs = Vec::new();
        if let Some(objects) = result.contents {
            for object in objects {
                if let Some(key) = object.key {
                    blobs.push(BlobInfo {
                        url: self.object_url(&key),
                        size_bytes: object.size.unwrap_or(0) as u64,
                        content_type: None,
                        uploaded_at: object.last_modified.map(|dt| dt.secs() * 1000),
                        key,
                    });
                }
            }
        }

        Ok(blobs)
    }
}
