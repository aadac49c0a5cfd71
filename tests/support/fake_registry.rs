// ABOUTME: In-memory registry double for pipeline tests.
// ABOUTME: Pages listings, records delete calls, and injects failures on request.

use async_trait::async_trait;
use ecr_cleaner::registry::{
    DeleteFailure, DeleteOutcome, ImagePage, ImageRegistry, RegistryError,
};
use ecr_cleaner::types::ImageRecord;
use nonempty::NonEmpty;
use parking_lot::Mutex;
use std::collections::HashSet;

#[derive(Default)]
struct State {
    images: Vec<ImageRecord>,
    list_calls: usize,
    delete_calls: Vec<Vec<String>>,
}

/// Registry holding images in memory, in "registry order".
pub struct FakeRegistry {
    state: Mutex<State>,
    page_size: usize,
    fail_list_page: Option<usize>,
    fail_delete_calls: HashSet<usize>,
}

impl FakeRegistry {
    pub fn new(images: Vec<ImageRecord>) -> Self {
        Self {
            state: Mutex::new(State {
                images,
                ..Default::default()
            }),
            page_size: 1000,
            fail_list_page: None,
            fail_delete_calls: HashSet::new(),
        }
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Fail the listing call for the given zero-based page.
    pub fn fail_list_page(mut self, page: usize) -> Self {
        self.fail_list_page = Some(page);
        self
    }

    /// Fail the given one-based delete call.
    pub fn fail_delete_call(mut self, call: usize) -> Self {
        self.fail_delete_calls.insert(call);
        self
    }

    /// Digests still present, in registry order.
    pub fn digests(&self) -> Vec<String> {
        self.state
            .lock()
            .images
            .iter()
            .filter_map(|i| i.digest.clone())
            .collect()
    }

    pub fn image_count(&self) -> usize {
        self.state.lock().images.len()
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().list_calls
    }

    pub fn delete_calls(&self) -> Vec<Vec<String>> {
        self.state.lock().delete_calls.clone()
    }
}

#[async_trait]
impl ImageRegistry for FakeRegistry {
    async fn list_images(
        &self,
        _repository: &str,
        next_token: Option<&str>,
    ) -> Result<ImagePage, RegistryError> {
        let mut state = self.state.lock();
        state.list_calls += 1;

        let page: usize = next_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        if self.fail_list_page == Some(page) {
            return Err(RegistryError::Transport("connection reset".to_string()));
        }

        let start = (page * self.page_size).min(state.images.len());
        let end = (start + self.page_size).min(state.images.len());
        let next_token = (end < state.images.len()).then(|| (page + 1).to_string());

        Ok(ImagePage {
            images: state.images[start..end].to_vec(),
            next_token,
        })
    }

    async fn delete_images(
        &self,
        _repository: &str,
        digests: &NonEmpty<String>,
    ) -> Result<DeleteOutcome, RegistryError> {
        let mut state = self.state.lock();
        state.delete_calls.push(digests.iter().cloned().collect());

        if self.fail_delete_calls.contains(&state.delete_calls.len()) {
            return Err(RegistryError::Service("throttled".to_string()));
        }

        let mut outcome = DeleteOutcome::default();
        for digest in digests {
            let before = state.images.len();
            state.images.retain(|i| i.digest.as_ref() != Some(digest));
            if state.images.len() < before {
                outcome.deleted.push(digest.clone());
            } else {
                outcome.failures.push(DeleteFailure {
                    digest: digest.clone(),
                    code: Some("ImageNotFound".to_string()),
                    reason: Some("Requested image not found".to_string()),
                });
            }
        }

        Ok(outcome)
    }
}
