use std::sync::Arc;

use crate::domain::{
    Field, InterestId, NewPost, Post, PostChange, PostDraft, PostId, PostPatch, UserId,
    normalize_interest_ids, store_time_now,
};
use crate::error::DomainError;
use crate::etag::{EntityTag, IfMatch};
use crate::ports::{InterestCatalog, PostStore, Precondition, WriteOutcome};

/// Create, update and delete posts under optimistic concurrency control.
///
/// Every write to an existing post must carry the entity tag the caller last
/// read. The tag is checked once against a fresh read to fail fast, and again
/// by the store against the locked row, so the first writer to commit wins
/// and every other holder of the old tag gets [`DomainError::Conflict`].
pub struct MutationEngine {
    store: Arc<dyn PostStore>,
    catalog: Arc<dyn InterestCatalog>,
}

impl MutationEngine {
    pub fn new(store: Arc<dyn PostStore>, catalog: Arc<dyn InterestCatalog>) -> Self {
        Self { store, catalog }
    }

    pub async fn create(&self, creator: &UserId, draft: PostDraft) -> Result<Post, DomainError> {
        validate_title(&draft.title)?;
        let interest_ids = self.validate_interests(draft.interest_ids).await?;

        let post = self
            .store
            .insert_post(NewPost {
                title: draft.title,
                body: draft.body,
                image_url: draft.image_url,
                created_by: creator.clone(),
                created_at: store_time_now(),
                interest_ids,
            })
            .await?;

        tracing::info!(post_id = post.post_id, created_by = %creator, "Post created");
        Ok(post)
    }

    /// Replace title, body, image and the whole interest set.
    pub async fn full_update(
        &self,
        post_id: PostId,
        mut draft: PostDraft,
        if_match: Option<&IfMatch>,
    ) -> Result<Post, DomainError> {
        let (_, if_match) = self.load_current(post_id, if_match).await?;
        validate_title(&draft.title)?;
        draft.interest_ids = self.validate_interests(draft.interest_ids).await?;
        self.commit(post_id, if_match, draft.into_patch()).await
    }

    /// Overwrite only the fields present in `patch`.
    pub async fn partial_update(
        &self,
        post_id: PostId,
        mut patch: PostPatch,
        if_match: Option<&IfMatch>,
    ) -> Result<Post, DomainError> {
        let (_, if_match) = self.load_current(post_id, if_match).await?;
        if patch.is_empty() {
            return Err(DomainError::Validation(
                "patch must contain at least one field".to_string(),
            ));
        }
        if let Some(title) = patch.title.as_present() {
            validate_title(title)?;
        }

        if let Field::Present(ids) = patch.interest_ids {
            patch.interest_ids = Field::Present(self.validate_interests(ids).await?);
        }
        self.commit(post_id, if_match, patch).await
    }

    /// Associate additional interests, keeping the existing ones.
    pub async fn add_interests(
        &self,
        post_id: PostId,
        interest_ids: Vec<InterestId>,
        if_match: Option<&IfMatch>,
    ) -> Result<Post, DomainError> {
        let (current, if_match) = self.load_current(post_id, if_match).await?;
        if interest_ids.is_empty() {
            return Err(DomainError::Validation(
                "interest_ids must not be empty".to_string(),
            ));
        }
        let mut merged = self.validate_interests(interest_ids).await?;
        merged.extend_from_slice(&current.interest_ids);

        let patch = PostPatch {
            interest_ids: Field::Present(normalize_interest_ids(merged)),
            ..Default::default()
        };
        self.commit(post_id, if_match, patch).await
    }

    /// Drop one interest association.
    pub async fn remove_interest(
        &self,
        post_id: PostId,
        interest_id: InterestId,
        if_match: Option<&IfMatch>,
    ) -> Result<Post, DomainError> {
        let (current, if_match) = self.load_current(post_id, if_match).await?;
        if !current.interest_ids.contains(&interest_id) {
            return Err(DomainError::not_found(
                "post interest",
                format!("{post_id}/{interest_id}"),
            ));
        }

        let remaining = current
            .interest_ids
            .iter()
            .copied()
            .filter(|id| *id != interest_id)
            .collect();
        let patch = PostPatch {
            interest_ids: Field::Present(remaining),
            ..Default::default()
        };
        self.commit(post_id, if_match, patch).await
    }

    /// Remove the post together with its interest associations and likes.
    pub async fn delete(
        &self,
        post_id: PostId,
        if_match: Option<&IfMatch>,
    ) -> Result<(), DomainError> {
        let (_, if_match) = self.load_current(post_id, if_match).await?;
        let guard: Precondition<'_> = &|post: &Post| if_match.matches(&EntityTag::compute(post));

        match self.store.delete_post_if(post_id, guard).await? {
            WriteOutcome::Applied(()) => {
                tracing::info!(post_id, "Post deleted");
                Ok(())
            }
            WriteOutcome::Rejected => Err(stale(post_id)),
            WriteOutcome::Missing => Err(DomainError::not_found("post", post_id)),
        }
    }

    /// Read the post and check the caller's tag against it.
    async fn load_current<'a>(
        &self,
        post_id: PostId,
        if_match: Option<&'a IfMatch>,
    ) -> Result<(Post, &'a IfMatch), DomainError> {
        let current = self
            .store
            .find_post(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;
        let if_match = if_match.ok_or(DomainError::PreconditionRequired)?;
        if !if_match.matches(&EntityTag::compute(&current)) {
            return Err(stale(post_id));
        }
        Ok((current, if_match))
    }

    async fn commit(
        &self,
        post_id: PostId,
        if_match: &IfMatch,
        patch: PostPatch,
    ) -> Result<Post, DomainError> {
        let guard: Precondition<'_> = &|post: &Post| if_match.matches(&EntityTag::compute(post));
        let change = PostChange {
            patch,
            touched_at: store_time_now(),
        };

        match self.store.update_post_if(post_id, guard, change).await? {
            WriteOutcome::Applied(post) => {
                tracing::info!(post_id, "Post updated");
                Ok(post)
            }
            WriteOutcome::Rejected => Err(stale(post_id)),
            WriteOutcome::Missing => Err(DomainError::not_found("post", post_id)),
        }
    }

    /// Normalize ids and make sure each one is in the catalog.
    async fn validate_interests(
        &self,
        interest_ids: Vec<InterestId>,
    ) -> Result<Vec<InterestId>, DomainError> {
        let interest_ids = normalize_interest_ids(interest_ids);
        for id in &interest_ids {
            if !self.catalog.interest_exists(*id).await? {
                return Err(DomainError::Validation(format!("Interest {id} not found")));
            }
        }
        Ok(interest_ids)
    }
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::Validation("title must not be empty".to_string()));
    }
    Ok(())
}

fn stale(post_id: PostId) -> DomainError {
    tracing::warn!(post_id, "Rejected write with stale entity tag");
    DomainError::Conflict { post_id }
}
