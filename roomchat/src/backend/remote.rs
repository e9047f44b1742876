use crate::backend::Backend;
use crate::feed::Subscription;
use crate::message::model::{Message, NewMessage};
use crate::room::model::Room;
use crate::server::rest_api::models::{CreateMessageRequest, CreateRoomRequest};
use crate::store::Store;
use crate::store::error::StoreError;
use crate::types::uuid::Uuid;
use anyhow::anyhow;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::StatusCode;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite;
use tracing::{debug, warn};

/// Backend talking to a roomchat server over its REST API and its WebSocket change feed.
#[derive(Clone)]
pub struct RemoteBackend {
	client: reqwest::Client,
	base_url: String,
}

impl RemoteBackend {
	pub fn new(base_url: &str) -> Result<Self, StoreError> {
		let base_url = base_url.trim_end_matches('/').to_string();
		if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
			return Err(StoreError::Connection(anyhow!(
				"Server URL must start with http:// or https://, got '{base_url}'"
			)));
		}

		Ok(Self {
			client: reqwest::Client::new(),
			base_url,
		})
	}

	fn url(&self, path: &str) -> String {
		format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
	}

	fn feed_url(&self, room_id: Uuid) -> String {
		let url = self.url(&format!("rooms/{room_id}/feed"));
		match url.strip_prefix("https://") {
			Some(rest) => format!("wss://{rest}"),
			None => format!("ws://{}", url.trim_start_matches("http://")),
		}
	}
}

#[async_trait]
impl Store for RemoteBackend {
	async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
		let response = self.client.get(self.url("rooms")).send().await?.error_for_status()?;
		Ok(response.json().await?)
	}

	async fn get_room(&self, room_id: Uuid) -> Result<Option<Room>, StoreError> {
		let response = self.client.get(self.url(&format!("rooms/{room_id}"))).send().await?;
		if response.status() == StatusCode::NOT_FOUND {
			return Ok(None);
		}

		Ok(Some(response.error_for_status()?.json().await?))
	}

	async fn create_room(&self, name: &str) -> Result<Room, StoreError> {
		let request = CreateRoomRequest { name: name.to_string() };
		let response = self
			.client
			.post(self.url("rooms"))
			.json(&request)
			.send()
			.await?
			.error_for_status()?;
		Ok(response.json().await?)
	}

	async fn list_messages(&self, room_id: Uuid) -> Result<Vec<Message>, StoreError> {
		let response = self
			.client
			.get(self.url(&format!("rooms/{room_id}/messages")))
			.send()
			.await?
			.error_for_status()?;
		Ok(response.json().await?)
	}

	async fn create_message(
		&self,
		NewMessage {
			room_id,
			nickname,
			content,
			kind,
		}: NewMessage,
	) -> Result<Message, StoreError> {
		let request = CreateMessageRequest {
			nickname,
			content,
			kind,
		};
		let response = self
			.client
			.post(self.url(&format!("rooms/{room_id}/messages")))
			.json(&request)
			.send()
			.await?
			.error_for_status()?;
		Ok(response.json().await?)
	}
}

#[async_trait]
impl Backend for RemoteBackend {
	async fn subscribe(&self, room_id: Uuid) -> Result<Subscription, StoreError> {
		let (mut websocket, _response) = tokio_tungstenite::connect_async(self.feed_url(room_id)).await?;
		let (sender, receiver) = mpsc::unbounded_channel();

		let forwarding = tokio::spawn(async move {
			while let Some(frame) = websocket.next().await {
				match frame {
					Ok(tungstenite::Message::Text(text)) => match serde_json::from_str::<Message>(text.as_str()) {
						Ok(message) => {
							if sender.send(message).is_err() {
								break;
							}
						}
						Err(error) => warn!(%room_id, "Ignoring malformed change feed message: {error}"),
					},
					Ok(tungstenite::Message::Close(_)) => break,
					Ok(_) => {}
					Err(error) => {
						warn!(%room_id, "Change feed connection failed: {error}");
						break;
					}
				}
			}
			debug!(%room_id, "Change feed connection ended.");
		});

		let forwarding = forwarding.abort_handle();
		Ok(Subscription::new(room_id, receiver, move || forwarding.abort()))
	}
}
