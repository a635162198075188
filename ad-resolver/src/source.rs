//! The remote operations the resolver depends on.

use async_trait::async_trait;

use ad_api::{ApiClient, DelayedLink, StreamRequest, UnlockedLink};
use ad_core::error::AdResult;

/// Link operations needed to resolve a delayed stream.
///
/// Remote `"error"` envelopes surface as [`ad_core::AdError::Api`].
#[async_trait]
pub trait DelayedLinkApi: Send + Sync {
    /// Unlock a hoster link.
    async fn unlock(&self, link: &str) -> AdResult<UnlockedLink>;

    /// Request one stream quality of an unlocked link.
    async fn request_stream(&self, link: &str, id: &str, stream_id: &str) -> AdResult<StreamRequest>;

    /// Poll a delayed job.
    async fn poll_delayed(&self, delayed_id: &str) -> AdResult<DelayedLink>;

    /// Release the underlying session. Must be idempotent.
    fn release(&self);
}

#[async_trait]
impl DelayedLinkApi for ApiClient {
    async fn unlock(&self, link: &str) -> AdResult<UnlockedLink> {
        self.unlock_link(link, None).await
    }

    async fn request_stream(&self, link: &str, id: &str, stream_id: &str) -> AdResult<StreamRequest> {
        self.streaming_link(link, id, stream_id).await
    }

    async fn poll_delayed(&self, delayed_id: &str) -> AdResult<DelayedLink> {
        self.delayed_link(delayed_id).await
    }

    fn release(&self) {
        ApiClient::release(self)
    }
}

#[async_trait]
impl<T: DelayedLinkApi + ?Sized> DelayedLinkApi for std::sync::Arc<T> {
    async fn unlock(&self, link: &str) -> AdResult<UnlockedLink> {
        (**self).unlock(link).await
    }

    async fn request_stream(&self, link: &str, id: &str, stream_id: &str) -> AdResult<StreamRequest> {
        (**self).request_stream(link, id, stream_id).await
    }

    async fn poll_delayed(&self, delayed_id: &str) -> AdResult<DelayedLink> {
        (**self).poll_delayed(delayed_id).await
    }

    fn release(&self) {
        (**self).release()
    }
}
