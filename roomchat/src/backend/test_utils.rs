use crate::backend::Backend;
use crate::backend::local::LocalBackend;
use crate::feed::Subscription;
use crate::message::model::{Message, NewMessage};
use crate::room::model::Room;
use crate::store::Store;
use crate::store::error::StoreError;
use crate::store::test::{DefaultTestFactory, TestFactory};
use crate::types::uuid::Uuid;
use anyhow::anyhow;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::watch;

pub async fn local_backend() -> LocalBackend {
	LocalBackend::new(DefaultTestFactory::store().await)
}

/// Local backend that counts mutating calls and can be told to fail or stall them, or to fail reads and subscriptions.
pub struct TestBackend {
	inner: LocalBackend,
	fail_inserts: AtomicBool,
	fail_reads: AtomicBool,
	fail_subscriptions: AtomicBool,
	room_inserts: AtomicUsize,
	message_inserts: AtomicUsize,
	inserts_paused: watch::Sender<bool>,
}

impl TestBackend {
	pub async fn new() -> Self {
		Self::wrapping(local_backend().await)
	}

	pub fn wrapping(inner: LocalBackend) -> Self {
		Self {
			inner,
			fail_inserts: AtomicBool::new(false),
			fail_reads: AtomicBool::new(false),
			fail_subscriptions: AtomicBool::new(false),
			room_inserts: AtomicUsize::new(0),
			message_inserts: AtomicUsize::new(0),
			inserts_paused: watch::Sender::new(false),
		}
	}

	pub fn local(&self) -> &LocalBackend {
		&self.inner
	}

	pub fn fail_inserts(&self, fail: bool) {
		self.fail_inserts.store(fail, Ordering::SeqCst);
	}

	/// Makes listing rooms, getting a room and listing messages fail.
	pub fn fail_reads(&self, fail: bool) {
		self.fail_reads.store(fail, Ordering::SeqCst);
	}

	pub fn fail_subscriptions(&self, fail: bool) {
		self.fail_subscriptions.store(fail, Ordering::SeqCst);
	}

	/// Inserts started while paused wait until [`TestBackend::resume_inserts`] is called.
	pub fn pause_inserts(&self) {
		self.inserts_paused.send_replace(true);
	}

	pub fn resume_inserts(&self) {
		self.inserts_paused.send_replace(false);
	}

	pub fn room_insert_count(&self) -> usize {
		self.room_inserts.load(Ordering::SeqCst)
	}

	pub fn message_insert_count(&self) -> usize {
		self.message_inserts.load(Ordering::SeqCst)
	}

	async fn before_insert(&self) -> Result<(), StoreError> {
		let mut paused = self.inserts_paused.subscribe();
		let _ = paused.wait_for(|paused| !*paused).await;

		if self.fail_inserts.load(Ordering::SeqCst) {
			return Err(StoreError::Database(anyhow!("Insert failed on purpose")));
		}
		Ok(())
	}

	fn before_read(&self) -> Result<(), StoreError> {
		if self.fail_reads.load(Ordering::SeqCst) {
			return Err(StoreError::Database(anyhow!("Read failed on purpose")));
		}
		Ok(())
	}
}

#[async_trait]
impl Store for TestBackend {
	async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
		self.before_read()?;
		self.inner.list_rooms().await
	}

	async fn get_room(&self, room_id: Uuid) -> Result<Option<Room>, StoreError> {
		self.before_read()?;
		self.inner.get_room(room_id).await
	}

	async fn create_room(&self, name: &str) -> Result<Room, StoreError> {
		self.room_inserts.fetch_add(1, Ordering::SeqCst);
		self.before_insert().await?;
		self.inner.create_room(name).await
	}

	async fn list_messages(&self, room_id: Uuid) -> Result<Vec<Message>, StoreError> {
		self.before_read()?;
		self.inner.list_messages(room_id).await
	}

	async fn create_message(&self, new_message: NewMessage) -> Result<Message, StoreError> {
		self.message_inserts.fetch_add(1, Ordering::SeqCst);
		self.before_insert().await?;
		self.inner.create_message(new_message).await
	}
}

#[async_trait]
impl Backend for TestBackend {
	async fn subscribe(&self, room_id: Uuid) -> Result<Subscription, StoreError> {
		if self.fail_subscriptions.load(Ordering::SeqCst) {
			return Err(StoreError::Connection(anyhow!("Subscription failed on purpose")));
		}
		self.inner.subscribe(room_id).await
	}
}
