use crate::room::model::Room;
use crate::route::Route;
use crate::store::Store;
use crate::store::error::StoreError;
use crate::validation::{ValidationError, non_blank};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum DirectoryError {
	#[error(transparent)]
	Validation(#[from] ValidationError),
	#[error(transparent)]
	Store(#[from] StoreError),
}

/// Lists and creates rooms.
#[derive(Clone)]
pub struct Directory {
	store: Arc<dyn Store>,
}

impl Directory {
	pub fn new(store: Arc<dyn Store>) -> Self {
		Self { store }
	}

	/// Newest room first.
	pub async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
		self.store.list_rooms().await.inspect_err(|error| {
			error!("Error listing rooms: {error}");
		})
	}

	pub async fn create_room(&self, name: &str) -> Result<Room, DirectoryError> {
		let name = non_blank(name, ValidationError::EmptyRoomName)?;
		let room = self.store.create_room(name).await.inspect_err(|error| {
			error!("Error creating room '{name}': {error}");
		})?;
		Ok(room)
	}
}

/// Text of the "create room" form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateRoomForm {
	name: String,
}

impl CreateRoomForm {
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn edit(&mut self, name: impl Into<String>) {
		self.name = name.into();
	}

	/// Creates the room and returns where to go next. The text is only cleared if the room was created.
	pub async fn submit(&mut self, directory: &Directory) -> Result<Route, DirectoryError> {
		let room = directory.create_room(&self.name).await?;
		self.name.clear();
		Ok(Route::from(&room))
	}
}
