//! PostgreSQL store implementation.
//!
//! Conditional writes lock the post row (`SELECT ... FOR UPDATE`) inside a
//! transaction, re-read the interest set and evaluate the precondition before
//! changing anything. A rejected precondition drops the transaction, which
//! rolls it back.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func, LikeExpr, OnConflict, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbConn, DbErr, EntityTrait,
    LoaderTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait,
};

use feed_core::domain::{
    Interest, InterestId, LikeStatus, NewPost, Post, PostChange, PostId, PostQuery, UserId,
};
use feed_core::error::RepoError;
use feed_core::ports::{FollowGraph, InterestCatalog, PostStore, WriteOutcome};

use super::DatabaseConnections;
use super::entity::{follow, interest, post, post_interest, post_like};

type Guard<'a> = &'a (dyn for<'p> Fn(&'p Post) -> bool + Send + Sync);

/// PostgreSQL store implementing every port of the feed core.
pub struct PostgresFeedStore {
    connections: Arc<DatabaseConnections>,
}

impl PostgresFeedStore {
    pub fn new(db: DbConn) -> Self {
        Self::from_connections(Arc::new(DatabaseConnections { main: db }))
    }

    /// Share a pool that is also used elsewhere (health checks, migrations).
    pub fn from_connections(connections: Arc<DatabaseConnections>) -> Self {
        Self { connections }
    }

    fn db(&self) -> &DbConn {
        &self.connections.main
    }
}

/// Classify a SeaORM error without leaking it past the repository boundary.
fn repo_err(err: DbErr) -> RepoError {
    let message = err.to_string();
    match err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => RepoError::Connection(message),
        DbErr::RecordNotFound(_) => RepoError::NotFound,
        _ if message.contains("duplicate")
            || message.contains("unique")
            || message.contains("foreign key") =>
        {
            RepoError::Constraint(message)
        }
        _ => RepoError::Query(message),
    }
}

/// Escape LIKE metacharacters so the term matches literally.
pub(super) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub(super) fn select_posts(query: &PostQuery) -> Select<post::Entity> {
    let filter = &query.filter;
    let mut select = post::Entity::find();

    if let Some(interest_id) = filter.interest_id {
        select = select.filter(
            post::Column::PostId.in_subquery(
                Query::select()
                    .column(post_interest::Column::PostId)
                    .from(post_interest::Entity)
                    .and_where(post_interest::Column::InterestId.eq(interest_id))
                    .to_owned(),
            ),
        );
    }
    if let Some(creator) = &filter.created_by {
        select = select.filter(post::Column::CreatedBy.eq(creator.as_str()));
    }
    if let Some(authors) = &query.authors {
        select = select.filter(
            post::Column::CreatedBy.is_in(authors.iter().map(|author| author.as_str().to_string())),
        );
    }
    if let Some(term) = &filter.search {
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        select = select.filter(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col(post::Column::Title)))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col(post::Column::Body)))
                        .like(LikeExpr::new(pattern).escape('\\')),
                ),
        );
    }

    select
}

async fn interest_ids_of<C: ConnectionTrait>(
    conn: &C,
    post_id: PostId,
) -> Result<Vec<InterestId>, DbErr> {
    Ok(post_interest::Entity::find()
        .filter(post_interest::Column::PostId.eq(post_id))
        .order_by_asc(post_interest::Column::InterestId)
        .all(conn)
        .await?
        .into_iter()
        .map(|link| link.interest_id)
        .collect())
}

async fn insert_links<C: ConnectionTrait>(
    conn: &C,
    post_id: PostId,
    interest_ids: &[InterestId],
) -> Result<(), DbErr> {
    if interest_ids.is_empty() {
        return Ok(());
    }
    post_interest::Entity::insert_many(interest_ids.iter().map(|id| post_interest::ActiveModel {
        post_id: Set(post_id),
        interest_id: Set(*id),
    }))
    .exec_without_returning(conn)
    .await?;
    Ok(())
}

/// Lock the post row and load its full state.
async fn lock_post<C: ConnectionTrait>(
    conn: &C,
    post_id: PostId,
) -> Result<Option<(post::Model, Post)>, DbErr> {
    let Some(row) = post::Entity::find_by_id(post_id)
        .lock_exclusive()
        .one(conn)
        .await?
    else {
        return Ok(None);
    };
    let current = row.clone().into_post(interest_ids_of(conn, post_id).await?);
    Ok(Some((row, current)))
}

impl PostgresFeedStore {
    async fn insert_tx(&self, new: NewPost) -> Result<Post, DbErr> {
        let txn = self.db().begin().await?;
        let row = post::ActiveModel::from(&new).insert(&txn).await?;
        insert_links(&txn, row.post_id, &new.interest_ids).await?;
        txn.commit().await?;
        Ok(row.into_post(new.interest_ids))
    }

    async fn update_tx(
        &self,
        post_id: PostId,
        precondition: Guard<'_>,
        change: PostChange,
    ) -> Result<WriteOutcome<Post>, DbErr> {
        let txn = self.db().begin().await?;
        let Some((row, current)) = lock_post(&txn, post_id).await? else {
            return Ok(WriteOutcome::Missing);
        };
        if !precondition(&current) {
            return Ok(WriteOutcome::Rejected);
        }

        let replace_links = change.patch.interest_ids.is_present();
        let mut updated = current;
        updated.apply(change);

        let mut active: post::ActiveModel = row.into();
        active.title = Set(updated.title.clone());
        active.body = Set(updated.body.clone());
        active.image_url = Set(updated.image_url.clone());
        active.updated_at = Set(updated.updated_at.into());
        active.update(&txn).await?;

        if replace_links {
            post_interest::Entity::delete_many()
                .filter(post_interest::Column::PostId.eq(post_id))
                .exec(&txn)
                .await?;
            insert_links(&txn, post_id, &updated.interest_ids).await?;
        }

        txn.commit().await?;
        Ok(WriteOutcome::Applied(updated))
    }

    async fn delete_tx(
        &self,
        post_id: PostId,
        precondition: Guard<'_>,
    ) -> Result<WriteOutcome<()>, DbErr> {
        let txn = self.db().begin().await?;
        let Some((_, current)) = lock_post(&txn, post_id).await? else {
            return Ok(WriteOutcome::Missing);
        };
        if !precondition(&current) {
            return Ok(WriteOutcome::Rejected);
        }

        post_like::Entity::delete_many()
            .filter(post_like::Column::PostId.eq(post_id))
            .exec(&txn)
            .await?;
        post_interest::Entity::delete_many()
            .filter(post_interest::Column::PostId.eq(post_id))
            .exec(&txn)
            .await?;
        post::Entity::delete_by_id(post_id).exec(&txn).await?;

        txn.commit().await?;
        Ok(WriteOutcome::Applied(()))
    }

    async fn find_posts_inner(&self, query: &PostQuery) -> Result<(Vec<Post>, u64), DbErr> {
        let select = select_posts(query);
        let total = select.clone().count(self.db()).await?;

        let rows = select
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::PostId)
            .offset(query.page.skip)
            .limit(query.page.limit)
            .all(self.db())
            .await?;
        let links = rows.load_many(post_interest::Entity, self.db()).await?;

        let posts = rows
            .into_iter()
            .zip(links)
            .map(|(row, links)| row.into_post(links.into_iter().map(|l| l.interest_id).collect()))
            .collect();
        Ok((posts, total))
    }

    async fn set_like_tx(
        &self,
        post_id: PostId,
        user_id: &UserId,
        liked: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<LikeStatus>, DbErr> {
        let txn = self.db().begin().await?;
        let exists = post::Entity::find_by_id(post_id)
            .lock_shared()
            .one(&txn)
            .await?
            .is_some();
        if !exists {
            return Ok(None);
        }

        if liked {
            post_like::Entity::insert(post_like::ActiveModel {
                post_id: Set(post_id),
                user_id: Set(user_id.as_str().to_string()),
                created_at: Set(at.into()),
            })
            .on_conflict(
                OnConflict::columns([post_like::Column::PostId, post_like::Column::UserId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
        } else {
            post_like::Entity::delete_many()
                .filter(post_like::Column::PostId.eq(post_id))
                .filter(post_like::Column::UserId.eq(user_id.as_str()))
                .exec(&txn)
                .await?;
        }

        let likes_count = post_like::Entity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .count(&txn)
            .await?;
        txn.commit().await?;

        Ok(Some(LikeStatus {
            post_id,
            likes_count,
            liked,
        }))
    }
}

#[async_trait]
impl PostStore for PostgresFeedStore {
    async fn find_post(&self, post_id: PostId) -> Result<Option<Post>, RepoError> {
        // One statement, so the row and its interests come from the same snapshot.
        let mut found = post::Entity::find_by_id(post_id)
            .find_with_related(post_interest::Entity)
            .all(self.db())
            .await
            .map_err(repo_err)?;

        Ok(found.pop().map(|(row, links)| {
            row.into_post(links.into_iter().map(|l| l.interest_id).collect())
        }))
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post, RepoError> {
        self.insert_tx(post).await.map_err(repo_err)
    }

    async fn update_post_if(
        &self,
        post_id: PostId,
        precondition: &(dyn for<'p> Fn(&'p Post) -> bool + Send + Sync),
        change: PostChange,
    ) -> Result<WriteOutcome<Post>, RepoError> {
        self.update_tx(post_id, precondition, change)
            .await
            .map_err(repo_err)
    }

    async fn delete_post_if(
        &self,
        post_id: PostId,
        precondition: &(dyn for<'p> Fn(&'p Post) -> bool + Send + Sync),
    ) -> Result<WriteOutcome<()>, RepoError> {
        self.delete_tx(post_id, precondition).await.map_err(repo_err)
    }

    async fn find_posts(&self, query: &PostQuery) -> Result<(Vec<Post>, u64), RepoError> {
        tracing::debug!(?query, "Listing posts");
        self.find_posts_inner(query).await.map_err(repo_err)
    }

    async fn count_likes(&self, post_id: PostId) -> Result<u64, RepoError> {
        post_like::Entity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .count(self.db())
            .await
            .map_err(repo_err)
    }

    async fn set_like(
        &self,
        post_id: PostId,
        user_id: &UserId,
        liked: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<LikeStatus>, RepoError> {
        self.set_like_tx(post_id, user_id, liked, at)
            .await
            .map_err(repo_err)
    }
}

#[async_trait]
impl FollowGraph for PostgresFeedStore {
    async fn followees(&self, viewer: &UserId) -> Result<Vec<UserId>, RepoError> {
        let edges = follow::Entity::find()
            .filter(follow::Column::FollowerId.eq(viewer.as_str()))
            .order_by_asc(follow::Column::FolloweeId)
            .all(self.db())
            .await
            .map_err(repo_err)?;

        Ok(edges
            .into_iter()
            .map(|edge| UserId::from(edge.followee_id))
            .collect())
    }
}

#[async_trait]
impl InterestCatalog for PostgresFeedStore {
    async fn interest_exists(&self, interest_id: InterestId) -> Result<bool, RepoError> {
        let found = interest::Entity::find_by_id(interest_id)
            .one(self.db())
            .await
            .map_err(repo_err)?;
        Ok(found.is_some())
    }

    async fn find_interests(&self, ids: &[InterestId]) -> Result<Vec<Interest>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = interest::Entity::find()
            .filter(interest::Column::InterestId.is_in(ids.iter().copied()))
            .order_by_asc(interest::Column::InterestId)
            .all(self.db())
            .await
            .map_err(repo_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_interests(&self) -> Result<Vec<Interest>, RepoError> {
        let rows = interest::Entity::find()
            .order_by_asc(interest::Column::InterestName)
            .all(self.db())
            .await
            .map_err(repo_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
