use crate::message::model::{Message, NewMessage};
use crate::room::model::Room;
use crate::store::error::StoreError;
use crate::types::uuid::Uuid;
use async_trait::async_trait;
use static_assertions::assert_obj_safe;

pub mod error;
pub mod sqlite;


/// Request/response access to the persisted rooms and messages.
#[async_trait]
pub trait Store: Send + Sync {
	/// All rooms, newest first.
	async fn list_rooms(&self) -> Result<Vec<Room>, StoreError>;
	async fn get_room(&self, room_id: Uuid) -> Result<Option<Room>, StoreError>;
	async fn create_room(&self, name: &str) -> Result<Room, StoreError>;

	/// All messages of a room, oldest first.
	async fn list_messages(&self, room_id: Uuid) -> Result<Vec<Message>, StoreError>;
	async fn create_message(&self, new_message: NewMessage) -> Result<Message, StoreError>;
}

assert_obj_safe!(Store);
