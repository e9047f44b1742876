use crate::feed::Subscription;
use crate::store::Store;
use crate::store::error::StoreError;
use crate::types::uuid::Uuid;
use async_trait::async_trait;
use static_assertions::assert_obj_safe;

pub mod local;
pub mod remote;
#[cfg(test)]
pub mod test_utils;

/// Everything a client consumes from the managed service: the store query surface plus the change feed.
#[async_trait]
pub trait Backend: Store {
	/// Subscribe to every message inserted into the given room from now on.
	async fn subscribe(&self, room_id: Uuid) -> Result<Subscription, StoreError>;
}

assert_obj_safe!(Backend);
