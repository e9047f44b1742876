use crate::types::date_time::DateTime;
use crate::types::uuid::Uuid;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(FromRow, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
	pub id: Uuid,
	pub room_id: Uuid,
	pub nickname: String,
	pub content: String,
	pub created_at: DateTime,
	pub kind: MessageKind,
}

#[derive(sqlx::Type, Serialize, Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
	#[default]
	Message,
	NicknameChange,
}

/// A message as submitted by a client, before the store assigned id and timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewMessage {
	pub room_id: Uuid,
	pub nickname: String,
	pub content: String,
	pub kind: MessageKind,
}

impl NewMessage {
	pub fn chat(room_id: Uuid, nickname: impl Into<String>, content: impl Into<String>) -> Self {
		Self {
			room_id,
			nickname: nickname.into(),
			content: content.into(),
			kind: MessageKind::Message,
		}
	}

	/// Announcement that `old_nickname` is now known as `new_nickname`. It is attributed to the old nickname.
	pub fn nickname_change(room_id: Uuid, old_nickname: &str, new_nickname: &str) -> Self {
		Self {
			room_id,
			nickname: old_nickname.to_string(),
			content: format!("{old_nickname} changed their nickname to {new_nickname}"),
			kind: MessageKind::NicknameChange,
		}
	}
}
