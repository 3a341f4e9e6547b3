//! Domain entities - the core business objects.

mod field;
mod interest;
mod page;
mod post;
mod view;

pub use field::Field;
pub use interest::{Interest, InterestId, normalize_interest_ids};
pub use page::{DEFAULT_LIMIT, MAX_LIMIT, Page, PageRequest, PostFilter, PostQuery};
pub use post::{NewPost, Post, PostChange, PostDraft, PostId, PostPatch, UserId, store_time_now};
pub use view::{LikeStatus, Link, LinkBuilder, PostLinks, PostView};
