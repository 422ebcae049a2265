//! Mock collaborators for deterministic testing

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use vitrine_core::{ChatMessage, ExtractedPage};

use crate::traits::{ExtractError, PageExtractor, ResponseDrafter};

/// Extractor that serves a fixed page and counts its calls.
pub struct MockExtractor {
    page: ExtractedPage,
    calls: AtomicUsize,
    fail: bool,
}

impl MockExtractor {
    pub fn new(page: ExtractedPage) -> Self {
        Self {
            page,
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    /// Extractor that always fails, for degradation tests.
    pub fn failing() -> Self {
        Self {
            page: ExtractedPage::default(),
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    /// How many times `extract` was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PageExtractor for MockExtractor {
    async fn extract(&self, url: &str) -> Result<ExtractedPage, ExtractError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.fail {
            return Err(ExtractError::Fetch(format!("unreachable: {url}")));
        }
        Ok(self.page.clone())
    }
}

/// Drafter that replays queued responses, then reports unavailable.
#[derive(Default)]
pub struct MockDrafter {
    responses: Mutex<VecDeque<String>>,
}

impl MockDrafter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a draft to return on the next call.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.lock().push_back(response.into());
        self
    }

    /// Drafter with nothing queued: generation is always unavailable.
    pub fn unavailable() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResponseDrafter for MockDrafter {
    async fn draft(
        &self,
        _question: &str,
        _context: &str,
        _history: &[ChatMessage],
    ) -> Option<String> {
        self.responses.lock().pop_front()
    }
}
