use serde::{Deserialize, Serialize};

pub type InterestId = i32;

/// Interest reference data - a tag that posts can be associated with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interest {
    pub interest_id: InterestId,
    pub interest_name: String,
}

/// Sort and de-duplicate a set of interest ids.
pub fn normalize_interest_ids(mut ids: Vec<InterestId>) -> Vec<InterestId> {
    ids.sort_unstable();
    ids.dedup();
    ids
}
