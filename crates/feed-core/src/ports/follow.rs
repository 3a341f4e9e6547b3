use async_trait::async_trait;

use crate::domain::UserId;
use crate::error::RepoError;

/// Follow graph - who a viewer follows.
#[async_trait]
pub trait FollowGraph: Send + Sync {
    /// Identities followed by `viewer`.
    async fn followees(&self, viewer: &UserId) -> Result<Vec<UserId>, RepoError>;
}
