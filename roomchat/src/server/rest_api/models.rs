use crate::message::model::MessageKind;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateRoomRequest {
	pub name: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateMessageRequest {
	pub nickname: String,
	pub content: String,
	#[serde(default)]
	pub kind: MessageKind,
}
