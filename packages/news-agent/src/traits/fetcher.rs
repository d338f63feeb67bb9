//! Fetch seam.

use async_trait::async_trait;

use crate::error::FetchResult;

/// Retrieves raw HTML for a URL.
///
/// The production implementation goes through an external unblocking proxy;
/// tests substitute an in-memory map. Retry policy lives in a wrapper, not
/// in implementations.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult<String>;
}
