use crate::backend::local::LocalBackend;
use crate::message::model::{Message, MessageKind};
use crate::room::model::Room;
use crate::server::create_router;
use crate::server::rest_api::error::ApiErrorResponse;
use crate::server_tests::test_client::TestClient;
use crate::server_tests::{start_test_server, test_context};
use crate::store::Store;
use crate::types::uuid::Uuid;
use axum::extract::FromRef;
use futures_util::StreamExt;
use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
async fn should_list_no_rooms_initially() {
	let client = start_test_server().await;

	let response = client.get("/api/rooms").send().await.expect("Request failed.");

	assert_eq!(StatusCode::OK, response.status());
	let rooms = response.json::<Vec<Room>>().await.expect("Failed to parse rooms");
	assert!(rooms.is_empty());
}

#[tokio::test]
async fn should_serve_the_backend_of_the_application_context() {
	let application_context = test_context().await;
	let backend = LocalBackend::from_ref(&application_context);
	let client = TestClient::new(create_router(application_context))
		.await
		.expect("Failed to start test server");

	let room = backend.create_room("general").await.expect("Failed to create room");

	let rooms = client
		.get("/api/rooms")
		.send()
		.await
		.expect("Request failed.")
		.json::<Vec<Room>>()
		.await
		.expect("Failed to parse rooms");
	assert_eq!(vec![room], rooms);
}

#[tokio::test]
async fn should_create_room_with_trimmed_name() {
	let client = start_test_server().await;

	let response = client
		.post("/api/rooms")
		.json(&json!({"name": "  general "}))
		.send()
		.await
		.expect("Request failed.");

	assert_eq!(StatusCode::CREATED, response.status());
	let room = response.json::<Room>().await.expect("Failed to parse room");
	assert_eq!("general", room.name);

	let fetched = client
		.get(&format!("/api/rooms/{}", room.id))
		.send()
		.await
		.expect("Request failed.")
		.json::<Room>()
		.await
		.expect("Failed to parse room");
	assert_eq!(room, fetched);
}

#[tokio::test]
async fn should_list_newest_room_first() {
	let client = start_test_server().await;
	create_room(&client, "random").await;
	let general = create_room(&client, "general").await;

	let rooms = client
		.get("/api/rooms")
		.send()
		.await
		.expect("Request failed.")
		.json::<Vec<Room>>()
		.await
		.expect("Failed to parse rooms");

	assert_eq!(2, rooms.len());
	assert_eq!(general, rooms[0]);
}

#[tokio::test]
async fn should_reject_blank_room_name() {
	let client = start_test_server().await;

	let response = client
		.post("/api/rooms")
		.json(&json!({"name": " \t "}))
		.send()
		.await
		.expect("Request failed.");

	assert_eq!(StatusCode::BAD_REQUEST, response.status());
	let error = response.json::<ApiErrorResponse>().await.expect("Failed to parse error");
	assert_eq!(
		ApiErrorResponse {
			r#type: "room-name-empty".to_string(),
			status: 400,
			message: "Room name must not be empty.".to_string(),
		},
		error
	);
}

#[tokio::test]
async fn should_not_find_unknown_rooms() {
	let client = start_test_server().await;
	let unknown = Uuid::new_v4();

	for path in [
		"/api/rooms/does-not-exist".to_string(),
		format!("/api/rooms/{unknown}"),
		format!("/api/rooms/{unknown}/messages"),
	] {
		let response = client.get(&path).send().await.expect("Request failed.");
		assert_eq!(StatusCode::NOT_FOUND, response.status(), "path: {path}");
		let error = response.json::<ApiErrorResponse>().await.expect("Failed to parse error");
		assert_eq!(ApiErrorResponse::room_not_found(), error);
	}
}

#[tokio::test]
async fn should_not_create_messages_in_unknown_rooms() {
	let client = start_test_server().await;

	let response = client
		.post(&format!("/api/rooms/{}/messages", Uuid::new_v4()))
		.json(&json!({"nickname": "alice", "content": "hi"}))
		.send()
		.await
		.expect("Request failed.");

	assert_eq!(StatusCode::NOT_FOUND, response.status());
}

#[tokio::test]
async fn should_create_and_list_messages_oldest_first() {
	let client = start_test_server().await;
	let room = create_room(&client, "general").await;

	let first = create_message(&client, &room, json!({"nickname": "alice", "content": "hi"})).await;
	let second = create_message(
		&client,
		&room,
		json!({"nickname": "alice", "content": "alice changed their nickname to alicia", "kind": "nickname_change"}),
	)
	.await;

	assert_eq!(room.id, first.room_id);
	assert_eq!(MessageKind::Message, first.kind);
	assert_eq!(MessageKind::NicknameChange, second.kind);

	let messages = client
		.get(&format!("/api/rooms/{}/messages", room.id))
		.send()
		.await
		.expect("Request failed.")
		.json::<Vec<Message>>()
		.await
		.expect("Failed to parse messages");
	assert_eq!(vec![first, second], messages);
}

#[tokio::test]
async fn should_reject_blank_message() {
	let client = start_test_server().await;
	let room = create_room(&client, "general").await;

	let response = client
		.post(&format!("/api/rooms/{}/messages", room.id))
		.json(&json!({"nickname": "alice", "content": "   "}))
		.send()
		.await
		.expect("Request failed.");

	assert_eq!(StatusCode::BAD_REQUEST, response.status());
	let error = response.json::<ApiErrorResponse>().await.expect("Failed to parse error");
	assert_eq!("message-content-empty", error.r#type);
}

#[tokio::test]
async fn should_push_inserted_messages_of_the_room_over_the_feed() {
	let client = start_test_server().await;
	let room = create_room(&client, "general").await;
	let other_room = create_room(&client, "random").await;
	let mut feed = client
		.websocket(&format!("/api/rooms/{}/feed", room.id))
		.await
		.expect("Failed to connect to feed");

	create_message(&client, &other_room, json!({"nickname": "bob", "content": "elsewhere"})).await;
	let message = create_message(&client, &room, json!({"nickname": "alice", "content": "hi"})).await;

	let text = timeout(Duration::from_secs(5), feed.next())
		.await
		.expect("Timed out waiting for the feed")
		.expect("Feed ended");
	let pushed = serde_json::from_str::<Message>(&text).expect("Failed to parse pushed message");
	assert_eq!(message, pushed);
}

#[tokio::test]
async fn should_not_open_feed_of_unknown_room() {
	let client = start_test_server().await;

	let result = client.websocket(&format!("/api/rooms/{}/feed", Uuid::new_v4())).await;

	assert!(result.is_err());
}

async fn create_room(client: &TestClient, name: &str) -> Room {
	client
		.post("/api/rooms")
		.json(&json!({ "name": name }))
		.send()
		.await
		.expect("Request failed.")
		.error_for_status()
		.expect("Failed to create room")
		.json()
		.await
		.expect("Failed to parse room")
}

async fn create_message(client: &TestClient, room: &Room, body: serde_json::Value) -> Message {
	client
		.post(&format!("/api/rooms/{}/messages", room.id))
		.json(&body)
		.send()
		.await
		.expect("Request failed.")
		.error_for_status()
		.expect("Failed to create message")
		.json()
		.await
		.expect("Failed to parse message")
}
