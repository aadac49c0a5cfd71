// ABOUTME: Amazon ECR implementation of the registry trait.
// ABOUTME: Wraps DescribeImages paging and BatchDeleteImage from aws-sdk-ecr.

use super::traits::{DeleteFailure, DeleteOutcome, ImagePage, ImageRegistry, RegistryError};
use crate::types::{ImageRecord, PushedAt};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_ecr::Client;
use aws_sdk_ecr::config::Region;
use aws_sdk_ecr::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ecr::types::{ImageDetail, ImageIdentifier};
use chrono::DateTime;
use nonempty::NonEmpty;

/// ECR client for a single region.
#[derive(Debug, Clone)]
pub struct EcrRegistry {
    client: Client,
}

impl EcrRegistry {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    /// Load the shared AWS configuration for a region. Credentials are taken
    /// from the default provider chain.
    pub async fn load_config(region: &str) -> SdkConfig {
        aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await
    }
}

#[async_trait]
impl ImageRegistry for EcrRegistry {
    async fn list_images(
        &self,
        repository: &str,
        next_token: Option<&str>,
    ) -> Result<ImagePage, RegistryError> {
        let output = self
            .client
            .describe_images()
            .repository_name(repository)
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| registry_error(repository, e))?;

        let images = output
            .image_details()
            .iter()
            .filter_map(image_record)
            .collect();

        Ok(ImagePage {
            images,
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn delete_images(
        &self,
        repository: &str,
        digests: &NonEmpty<String>,
    ) -> Result<DeleteOutcome, RegistryError> {
        let image_ids = digests
            .iter()
            .map(|digest| ImageIdentifier::builder().image_digest(digest).build())
            .collect();

        let output = self
            .client
            .batch_delete_image()
            .repository_name(repository)
            .set_image_ids(Some(image_ids))
            .send()
            .await
            .map_err(|e| registry_error(repository, e))?;

        let deleted = output
            .image_ids()
            .iter()
            .filter_map(|id| id.image_digest().map(str::to_string))
            .collect();

        let failures = output
            .failures()
            .iter()
            .map(|failure| DeleteFailure {
                digest: failure
                    .image_id()
                    .and_then(|id| id.image_digest())
                    .unwrap_or_default()
                    .to_string(),
                code: failure.failure_code().map(|c| c.as_str().to_string()),
                reason: failure.failure_reason().map(str::to_string),
            })
            .collect();

        Ok(DeleteOutcome { deleted, failures })
    }
}

/// Convert an ECR image detail into a record. Details without a push time
/// cannot be ordered and are skipped.
fn image_record(detail: &ImageDetail) -> Option<ImageRecord> {
    let Some(pushed_at) = detail.image_pushed_at() else {
        tracing::warn!(
            digest = detail.image_digest().unwrap_or("<none>"),
            "Image has no push time, ignoring it"
        );
        return None;
    };

    let Some(pushed_at) = DateTime::from_timestamp(pushed_at.secs(), pushed_at.subsec_nanos())
    else {
        tracing::warn!(
            digest = detail.image_digest().unwrap_or("<none>"),
            "Image push time is out of range, ignoring it"
        );
        return None;
    };

    Some(ImageRecord {
        digest: detail.image_digest().map(str::to_string),
        pushed_at: PushedAt::from(pushed_at),
        tags: detail.image_tags().to_vec(),
    })
}

fn registry_error<E, R>(repository: &str, err: SdkError<E, R>) -> RegistryError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.as_service_error() {
        Some(service) if service.code() == Some("RepositoryNotFoundException") => {
            RegistryError::RepositoryNotFound(repository.to_string())
        }
        Some(service) => RegistryError::Service(DisplayErrorContext(service).to_string()),
        None => RegistryError::Transport(DisplayErrorContext(&err).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ecr::primitives::DateTime as AwsDateTime;
    use chrono::{TimeZone, Utc};

    #[test]
    fn detail_converts_to_record() {
        let detail = ImageDetail::builder()
            .image_digest("sha256:abc")
            .image_tags("latest")
            .image_tags("v1.2.0")
            .image_pushed_at(AwsDateTime::from_secs(1_700_000_000))
            .build();

        let record = image_record(&detail).unwrap();
        assert_eq!(record.digest(), Some("sha256:abc"));
        assert_eq!(record.tags, vec!["latest", "v1.2.0"]);
        assert_eq!(
            record.pushed_at.instant(),
            Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap())
        );
    }

    #[test]
    fn detail_without_tags_is_untagged() {
        let detail = ImageDetail::builder()
            .image_digest("sha256:def")
            .image_pushed_at(AwsDateTime::from_secs(1_700_000_000))
            .build();

        assert!(image_record(&detail).unwrap().is_untagged());
    }

    #[test]
    fn detail_without_push_time_is_skipped() {
        let detail = ImageDetail::builder().image_digest("sha256:abc").build();
        assert!(image_record(&detail).is_none());
    }
}
