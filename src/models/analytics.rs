use serde::Serialize;

use super::collection::Collection;
use crate::store::{Store, StoreError};

/// Dashboard counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_projects: u64,
    pub total_posts: u64,
    pub total_videos: u64,
    pub total_certificates: u64,
    pub total_jobs: u64,
    pub total_reviews: u64,
    pub total_messages: u64,
    pub unread_messages: u64,
}

impl Analytics {
    pub fn gather(store: &dyn Store) -> Result<Self, StoreError> {
        Ok(Analytics {
            total_projects: store.count(Collection::Projects)?,
            total_posts: store.count(Collection::Posts)?,
            total_videos: store.count(Collection::Videos)?,
            total_certificates: store.count(Collection::Certificates)?,
            total_jobs: store.count(Collection::Jobs)?,
            total_reviews: store.count(Collection::Reviews)?,
            total_messages: store.count(Collection::Messages)?,
            unread_messages: store.count_unread(Collection::Messages)?,
        })
    }
}
