use crate::backend::Backend;
use crate::backend::local::LocalBackend;
use crate::context::ApplicationContext;
use crate::feed::Subscription;
use crate::message::model::{Message, NewMessage};
use crate::room::model::Room;
use crate::server::rest_api::error::ApiErrorResponse;
use crate::server::rest_api::models::{CreateMessageRequest, CreateRoomRequest};
use crate::store::Store;
use crate::types::uuid::Uuid;
use crate::validation::{ValidationError, non_blank};
use axum::extract::ws::{self, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use tracing::{debug, error};

pub mod error;
pub mod models;

pub fn rest_api() -> Router<ApplicationContext> {
	Router::new()
		.route("/rooms", get(list_rooms).post(create_room))
		.route("/rooms/{room_id}", get(get_room))
		.route("/rooms/{room_id}/messages", get(list_messages).post(create_message))
		.route("/rooms/{room_id}/feed", get(change_feed))
}

async fn list_rooms(State(backend): State<LocalBackend>) -> Result<Json<Vec<Room>>, ApiErrorResponse> {
	Ok(Json(backend.list_rooms().await?))
}

async fn create_room(
	State(backend): State<LocalBackend>,
	Json(CreateRoomRequest { name }): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<Room>), ApiErrorResponse> {
	let name = non_blank(&name, ValidationError::EmptyRoomName)?;
	let room = backend.create_room(name).await?;
	Ok((StatusCode::CREATED, Json(room)))
}

async fn get_room(
	State(backend): State<LocalBackend>,
	Path(room_id): Path<String>,
) -> Result<Json<Room>, ApiErrorResponse> {
	Ok(Json(existing_room(&backend, &room_id).await?))
}

async fn list_messages(
	State(backend): State<LocalBackend>,
	Path(room_id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiErrorResponse> {
	let room = existing_room(&backend, &room_id).await?;
	Ok(Json(backend.list_messages(room.id).await?))
}

async fn create_message(
	State(backend): State<LocalBackend>,
	Path(room_id): Path<String>,
	Json(CreateMessageRequest {
		nickname,
		content,
		kind,
	}): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<Message>), ApiErrorResponse> {
	let room = existing_room(&backend, &room_id).await?;
	let content = non_blank(&content, ValidationError::EmptyContent)?;

	let message = backend
		.create_message(NewMessage {
			room_id: room.id,
			nickname,
			content: content.to_string(),
			kind,
		})
		.await?;
	Ok((StatusCode::CREATED, Json(message)))
}

/// Upgrades to a WebSocket that receives every message inserted into the room as a JSON text frame.
///
/// The subscription is opened before the upgrade response is sent, so every insert that happens after the
/// client finished its handshake is delivered.
async fn change_feed(
	State(backend): State<LocalBackend>,
	Path(room_id): Path<String>,
	websocket: WebSocketUpgrade,
) -> Result<Response, ApiErrorResponse> {
	let room = existing_room(&backend, &room_id).await?;
	let subscription = backend.subscribe(room.id).await?;

	Ok(websocket.on_upgrade(move |socket| forward_feed(socket, subscription)))
}

async fn forward_feed(mut socket: WebSocket, mut subscription: Subscription) {
	let room_id = subscription.room_id();
	loop {
		tokio::select! {
			message = subscription.next() => {
				let Some(message) = message else {
					break;
				};
				let json = match serde_json::to_string(&message) {
					Ok(json) => json,
					Err(error) => {
						error!(%room_id, "Failed to serialize message: {error}");
						continue;
					}
				};
				if socket.send(ws::Message::Text(json.into())).await.is_err() {
					break;
				}
			}
			incoming = socket.recv() => match incoming {
				None | Some(Err(_) | Ok(ws::Message::Close(_))) => break,
				Some(Ok(_)) => {}
			},
		}
	}

	debug!(%room_id, "Change feed socket closed.");
	subscription.close();
}

/// Rooms are addressed by UUID, anything that doesn't parse can't exist either.
async fn existing_room(backend: &LocalBackend, room_id: &str) -> Result<Room, ApiErrorResponse> {
	let Ok(room_id) = room_id.parse::<Uuid>() else {
		return Err(ApiErrorResponse::room_not_found());
	};

	backend.get_room(room_id).await?.ok_or_else(ApiErrorResponse::room_not_found)
}
