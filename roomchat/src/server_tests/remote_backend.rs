use crate::backend::Backend;
use crate::backend::remote::RemoteBackend;
use crate::identity::MemoryIdentity;
use crate::message::model::{Message, NewMessage};
use crate::route::{Page, Route, resolve};
use crate::server_tests::start_test_server;
use crate::session::SessionView;
use crate::store::Store;
use crate::store::error::StoreError;
use crate::types::uuid::Uuid;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
async fn should_use_the_server_as_store() {
	let client = start_test_server().await;
	let backend = RemoteBackend::new(&client.base_url()).expect("Failed to create backend");

	let room = backend.create_room("general").await.expect("Failed to create room");
	let message = backend
		.create_message(NewMessage::chat(room.id, "alice", "hi"))
		.await
		.expect("Failed to create message");

	assert_eq!(vec![room.clone()], backend.list_rooms().await.expect("Failed to list rooms"));
	assert_eq!(Some(room.clone()), backend.get_room(room.id).await.expect("Failed to get room"));
	assert_eq!(None, backend.get_room(Uuid::new_v4()).await.expect("Failed to get room"));
	assert_eq!(
		vec![message],
		backend.list_messages(room.id).await.expect("Failed to list messages")
	);
}

#[tokio::test]
async fn should_report_rejected_requests_as_store_errors() {
	let client = start_test_server().await;
	let backend = RemoteBackend::new(&client.base_url()).expect("Failed to create backend");

	let result = backend.create_room(" ").await;

	assert!(matches!(result, Err(StoreError::Remote(_))));
}

#[tokio::test]
async fn should_resolve_unknown_room_to_not_found() {
	let client = start_test_server().await;
	let backend = RemoteBackend::new(&client.base_url()).expect("Failed to create backend");

	let page = resolve(&backend, &Route::Room(Uuid::new_v4()))
		.await
		.expect("Failed to resolve route");

	assert!(matches!(page, Page::NotFound));
}

#[tokio::test]
async fn should_deliver_each_message_once_to_every_session_in_the_room() {
	let client = start_test_server().await;
	let backend = Arc::new(RemoteBackend::new(&client.base_url()).expect("Failed to create backend"));
	let room = backend.create_room("general").await.expect("Failed to create room");

	let mut sessions = Vec::new();
	for nickname in ["alice", "bob"] {
		let session = SessionView::open(
			backend.clone(),
			Arc::new(MemoryIdentity::with_nickname(nickname)),
			room.clone(),
			Vec::new(),
		)
		.await
		.expect("Failed to open session");
		sessions.push(session);
	}

	sessions[0].send("hi").await.expect("Failed to send");
	sessions[1].send("hello").await.expect("Failed to send");

	for session in &sessions {
		let contents = wait_for_messages(session, 2)
			.await
			.into_iter()
			.map(|message| message.content)
			.collect::<Vec<_>>();
		assert_eq!(vec!["hi", "hello"], contents);
	}
	for session in sessions {
		session.leave().await;
	}
}

#[tokio::test]
async fn should_keep_delivering_to_open_subscriptions_when_another_closes() {
	let client = start_test_server().await;
	let backend = RemoteBackend::new(&client.base_url()).expect("Failed to create backend");
	let room = backend.create_room("general").await.expect("Failed to create room");
	let mut open = backend.subscribe(room.id).await.expect("Failed to subscribe");
	let closed = backend.subscribe(room.id).await.expect("Failed to subscribe");

	closed.close();
	let message = backend
		.create_message(NewMessage::chat(room.id, "alice", "hi"))
		.await
		.expect("Failed to create message");

	let delivered = timeout(Duration::from_secs(5), open.next())
		.await
		.expect("Timed out waiting for delivery");
	assert_eq!(Some(message), delivered);
}

async fn wait_for_messages(session: &SessionView, count: usize) -> Vec<Message> {
	let mut state = session.watch();
	timeout(
		Duration::from_secs(5),
		state.wait_for(|state| state.messages().len() >= count),
	)
	.await
	.expect("Timed out waiting for messages")
	.expect("Session closed");
	session.state().messages().to_vec()
}
