use async_trait::async_trait;

use crate::domain::{Interest, InterestId};
use crate::error::RepoError;

/// Interest catalog - read-mostly reference data.
#[async_trait]
pub trait InterestCatalog: Send + Sync {
    async fn interest_exists(&self, interest_id: InterestId) -> Result<bool, RepoError>;

    /// Resolve ids to interests, ordered by id. Unknown ids are skipped.
    async fn find_interests(&self, ids: &[InterestId]) -> Result<Vec<Interest>, RepoError>;

    /// All interests ordered by name.
    async fn list_interests(&self) -> Result<Vec<Interest>, RepoError>;
}
