use crate::message::model::Message;
use crate::room::model::Room;
use crate::store::Store;
use crate::store::error::StoreError;
use crate::types::uuid::Uuid;
use std::fmt::{Display, Formatter};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
	Directory,
	Room(Uuid),
	/// Any path that doesn't name a view, kept as it was requested.
	NotFound(String),
}

impl Route {
	pub fn parse(path: &str) -> Self {
		let trimmed = match path.strip_suffix('/') {
			Some(trimmed) if !trimmed.is_empty() => trimmed,
			_ => path,
		};

		match trimmed.split('/').collect::<Vec<_>>().as_slice() {
			["", ""] => Route::Directory,
			["", "room", room_id] => room_id
				.parse()
				.map_or_else(|_| Route::NotFound(path.to_string()), Route::Room),
			_ => Route::NotFound(path.to_string()),
		}
	}
}

impl Display for Route {
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Route::Directory => formatter.write_str("/"),
			Route::Room(room_id) => write!(formatter, "/room/{room_id}"),
			Route::NotFound(path) => formatter.write_str(path),
		}
	}
}

impl From<&Room> for Route {
	fn from(room: &Room) -> Self {
		Route::Room(room.id)
	}
}

/// What a route resolved to, with everything needed to show it.
#[derive(Debug)]
pub enum Page {
	Directory(Vec<Room>),
	Session { room: Room, messages: Vec<Message> },
	NotFound,
}

pub async fn resolve(store: &dyn Store, route: &Route) -> Result<Page, StoreError> {
	match route {
		Route::Directory => Ok(Page::Directory(store.list_rooms().await?)),
		Route::Room(room_id) => {
			let Some(room) = store.get_room(*room_id).await? else {
				debug!(%room_id, "No such room.");
				return Ok(Page::NotFound);
			};
			let messages = store.list_messages(room.id).await?;
			Ok(Page::Session { room, messages })
		}
		Route::NotFound(_) => Ok(Page::NotFound),
	}
}
