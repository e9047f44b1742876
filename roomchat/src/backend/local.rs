use crate::backend::Backend;
use crate::feed::{ChangeFeed, Subscription};
use crate::message::model::{Message, NewMessage};
use crate::room::model::Room;
use crate::store::Store;
use crate::store::error::StoreError;
use crate::types::uuid::Uuid;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// In-process backend: a store whose successful message inserts are pushed into a change feed.
#[derive(Clone)]
pub struct LocalBackend {
	store: Arc<dyn Store>,
	feed: ChangeFeed,
}

impl LocalBackend {
	pub fn new(store: Arc<dyn Store>) -> Self {
		Self {
			store,
			feed: ChangeFeed::default(),
		}
	}

	pub fn feed(&self) -> &ChangeFeed {
		&self.feed
	}
}

#[async_trait]
impl Store for LocalBackend {
	async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
		self.store.list_rooms().await
	}

	async fn get_room(&self, room_id: Uuid) -> Result<Option<Room>, StoreError> {
		self.store.get_room(room_id).await
	}

	async fn create_room(&self, name: &str) -> Result<Room, StoreError> {
		let room = self.store.create_room(name).await?;
		info!(room_id = %room.id, "Created room '{}'.", room.name);
		Ok(room)
	}

	async fn list_messages(&self, room_id: Uuid) -> Result<Vec<Message>, StoreError> {
		self.store.list_messages(room_id).await
	}

	async fn create_message(&self, new_message: NewMessage) -> Result<Message, StoreError> {
		let message = self.store.create_message(new_message).await?;
		self.feed.publish(&message);
		Ok(message)
	}
}

#[async_trait]
impl Backend for LocalBackend {
	async fn subscribe(&self, room_id: Uuid) -> Result<Subscription, StoreError> {
		Ok(self.feed.subscribe(room_id))
	}
}
