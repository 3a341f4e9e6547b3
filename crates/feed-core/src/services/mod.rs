//! Core services - mutation protocol, like ledger and feed assembly.

mod aggregator;
mod feed;
mod likes;
mod mutation;

use std::sync::Arc;

pub use aggregator::PostAggregator;
pub use feed::FeedQueryPlanner;
pub use likes::LikeLedger;
pub use mutation::MutationEngine;

use crate::domain::LinkBuilder;
use crate::ports::{FollowGraph, InterestCatalog, PostStore};

/// All core services wired to one set of ports.
pub struct FeedServices {
    pub mutations: MutationEngine,
    pub likes: LikeLedger,
    pub feed: FeedQueryPlanner,
}

impl FeedServices {
    pub fn new(
        store: Arc<dyn PostStore>,
        follows: Arc<dyn FollowGraph>,
        catalog: Arc<dyn InterestCatalog>,
        links: LinkBuilder,
    ) -> Self {
        let aggregator = PostAggregator::new(store.clone(), catalog.clone(), links);
        Self {
            mutations: MutationEngine::new(store.clone(), catalog),
            likes: LikeLedger::new(store.clone()),
            feed: FeedQueryPlanner::new(store, follows, aggregator),
        }
    }
}
