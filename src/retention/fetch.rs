// ABOUTME: Pages through a repository's full image listing.
// ABOUTME: Stops at the first registry error and keeps what was already fetched.

use snafu::ResultExt;

use super::error::FetchSnafu;
use crate::diagnostics::Diagnostics;
use crate::registry::ImageRegistry;
use crate::types::ImageRecord;

/// Fetch every image in `repository`, following pagination cursors until the
/// registry reports no further pages.
///
/// A registry error ends the listing: it is recorded in `diag` and the images
/// accumulated so far are returned.
pub async fn fetch_all<R: ImageRegistry + ?Sized>(
    registry: &R,
    repository: &str,
    diag: &mut Diagnostics,
) -> Vec<ImageRecord> {
    let mut images = Vec::new();
    let mut next_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = match registry
            .list_images(repository, next_token.as_deref())
            .await
            .context(FetchSnafu { repository })
        {
            Ok(page) => page,
            Err(e) => {
                diag.record(e);
                break;
            }
        };

        pages += 1;
        images.extend(page.images);

        match page.next_token {
            Some(token) if !token.is_empty() => next_token = Some(token),
            _ => break,
        }
    }

    tracing::debug!(repository, pages, images = images.len(), "Fetched image list");
    images
}
