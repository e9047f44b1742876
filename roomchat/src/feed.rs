use crate::message::model::Message;
use crate::types::uuid::Uuid;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tracing::debug;

/// Fans out inserted messages to everyone subscribed to the room they were inserted into.
///
/// Every subscriber has an unbounded queue of its own, so a slow subscriber never loses deliveries
/// and never slows down the others.
#[derive(Clone, Default)]
pub struct ChangeFeed {
	subscribers: Arc<Mutex<Subscribers>>,
}

#[derive(Default)]
struct Subscribers {
	next_id: u64,
	by_room: HashMap<Uuid, BTreeMap<u64, mpsc::UnboundedSender<Message>>>,
}

impl Subscribers {
	fn remove(&mut self, room_id: Uuid, subscriber_id: u64) {
		if let Some(room_subscribers) = self.by_room.get_mut(&room_id) {
			room_subscribers.remove(&subscriber_id);
			if room_subscribers.is_empty() {
				self.by_room.remove(&room_id);
			}
		}
	}
}

impl ChangeFeed {
	pub fn subscribe(&self, room_id: Uuid) -> Subscription {
		let (sender, receiver) = mpsc::unbounded_channel();

		let subscriber_id = {
			let mut subscribers = self.subscribers.lock();
			let subscriber_id = subscribers.next_id;
			subscribers.next_id += 1;
			subscribers
				.by_room
				.entry(room_id)
				.or_default()
				.insert(subscriber_id, sender);
			subscriber_id
		};
		debug!(%room_id, subscriber_id, "Opened change feed subscription.");

		let subscribers = Arc::downgrade(&self.subscribers);
		Subscription::new(room_id, receiver, move || unsubscribe(&subscribers, room_id, subscriber_id))
	}

	/// Delivers the message to every current subscriber of its room, returns the number of deliveries.
	pub fn publish(&self, message: &Message) -> usize {
		let mut subscribers = self.subscribers.lock();
		let Some(room_subscribers) = subscribers.by_room.get_mut(&message.room_id) else {
			return 0;
		};

		room_subscribers.retain(|_, sender| sender.send(message.clone()).is_ok());
		let delivered = room_subscribers.len();
		if room_subscribers.is_empty() {
			subscribers.by_room.remove(&message.room_id);
		}

		debug!(room_id = %message.room_id, message_id = %message.id, delivered, "Published message.");
		delivered
	}

	pub fn subscriber_count(&self, room_id: Uuid) -> usize {
		self.subscribers
			.lock()
			.by_room
			.get(&room_id)
			.map_or(0, BTreeMap::len)
	}
}

fn unsubscribe(subscribers: &Weak<Mutex<Subscribers>>, room_id: Uuid, subscriber_id: u64) {
	if let Some(subscribers) = subscribers.upgrade() {
		subscribers.lock().remove(room_id, subscriber_id);
		debug!(%room_id, subscriber_id, "Closed change feed subscription.");
	}
}

/// Handle of a live change feed subscription for one room.
///
/// Yields every message inserted into the room after the subscription was opened, in delivery order.
/// Closing (or dropping) the handle unsubscribes, after which nothing is delivered anymore.
pub struct Subscription {
	room_id: Uuid,
	receiver: mpsc::UnboundedReceiver<Message>,
	unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
	pub fn new(
		room_id: Uuid,
		receiver: mpsc::UnboundedReceiver<Message>,
		unsubscribe: impl FnOnce() + Send + Sync + 'static,
	) -> Self {
		Self {
			room_id,
			receiver,
			unsubscribe: Some(Box::new(unsubscribe)),
		}
	}

	pub fn room_id(&self) -> Uuid {
		self.room_id
	}

	/// Waits for the next inserted message. `None` once the feed went away.
	pub async fn next(&mut self) -> Option<Message> {
		self.receiver.recv().await
	}

	pub fn close(mut self) {
		self.unsubscribe_now();
	}

	fn unsubscribe_now(&mut self) {
		self.receiver.close();
		if let Some(unsubscribe) = self.unsubscribe.take() {
			unsubscribe();
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.unsubscribe_now();
	}
}

impl Debug for Subscription {
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
		formatter
			.debug_struct("Subscription")
			.field("room_id", &self.room_id)
			.field("closed", &self.unsubscribe.is_none())
			.finish_non_exhaustive()
	}
}
