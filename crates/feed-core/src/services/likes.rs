use std::sync::Arc;

use crate::domain::{LikeStatus, PostId, UserId, store_time_now};
use crate::error::DomainError;
use crate::ports::PostStore;

/// Idempotent per-(post, user) like toggles.
///
/// The count returned with each toggle is taken after the toggle, in the same
/// store transaction.
pub struct LikeLedger {
    store: Arc<dyn PostStore>,
}

impl LikeLedger {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    pub async fn like(&self, post_id: PostId, user_id: &UserId) -> Result<LikeStatus, DomainError> {
        self.set(post_id, user_id, true).await
    }

    pub async fn unlike(&self, post_id: PostId, user_id: &UserId) -> Result<LikeStatus, DomainError> {
        self.set(post_id, user_id, false).await
    }

    async fn set(
        &self,
        post_id: PostId,
        user_id: &UserId,
        liked: bool,
    ) -> Result<LikeStatus, DomainError> {
        let status = self
            .store
            .set_like(post_id, user_id, liked, store_time_now())
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;

        tracing::debug!(
            post_id,
            user_id = %user_id,
            liked,
            likes_count = status.likes_count,
            "Like state updated"
        );
        Ok(status)
    }
}
