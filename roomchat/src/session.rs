use crate::backend::Backend;
use crate::feed::Subscription;
use crate::identity::Identity;
use crate::message::model::{Message, NewMessage};
use crate::room::model::Room;
use crate::session::state::SessionState;
use crate::store::error::StoreError;
use crate::validation::ValidationError;
use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};
use std::future::IntoFuture;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

pub mod state;


#[derive(Error, Debug)]
pub enum SessionError {
	#[error(transparent)]
	Validation(#[from] ValidationError),
	#[error(transparent)]
	Store(#[from] StoreError),
	#[error("The session has been closed.")]
	Closed,
}

/// A client's live view of one room.
///
/// All session state is owned by a single event loop task. It processes commands from this handle,
/// change feed deliveries and completions of store calls one at a time, a store call in flight never
/// holds up the others. Leaving (or dropping the handle) closes the subscription and discards the
/// results of store calls that are still in flight.
pub struct SessionView {
	commands: mpsc::UnboundedSender<Command>,
	state: watch::Receiver<SessionState>,
	event_loop: JoinHandle<()>,
}

impl SessionView {
	/// Enters the room with the messages fetched for it, then subscribes to its change feed.
	pub async fn open(
		backend: Arc<dyn Backend>,
		identity: Arc<dyn Identity>,
		room: Room,
		initial_messages: Vec<Message>,
	) -> Result<Self, StoreError> {
		let subscription = backend.subscribe(room.id).await?;
		let state = SessionState::new(room, initial_messages, identity.nickname());
		let (state_sender, state_receiver) = watch::channel(state);
		let (command_sender, command_receiver) = mpsc::unbounded_channel();

		let event_loop = EventLoop {
			backend,
			identity,
			state: state_sender,
			subscription,
			commands: command_receiver,
			in_flight: FuturesUnordered::new(),
		};

		Ok(Self {
			commands: command_sender,
			state: state_receiver,
			event_loop: tokio::spawn(event_loop.run()),
		})
	}

	/// Current state. Don't hold on to the returned guard, it blocks the event loop.
	pub fn state(&self) -> watch::Ref<'_, SessionState> {
		self.state.borrow()
	}

	/// Receiver that is notified whenever the state changed.
	pub fn watch(&self) -> watch::Receiver<SessionState> {
		self.state.clone()
	}

	pub fn edit_draft(&self, draft: impl Into<String>) {
		let _ = self.commands.send(Command::EditDraft(draft.into()));
	}

	/// Passes the nickname gate and persists the nickname.
	pub fn submit_nickname(&self, nickname: impl Into<String>) -> Reply {
		self.request(|reply| Command::SubmitNickname {
			nickname: nickname.into(),
			reply,
		})
	}

	/// Sends the current draft. Resolves once the store accepted or rejected the message.
	pub fn submit_draft(&self) -> Reply {
		self.request(|reply| Command::SubmitDraft { reply })
	}

	/// Replaces the draft with `content` and sends it.
	pub fn send(&self, content: impl Into<String>) -> Reply {
		self.edit_draft(content);
		self.submit_draft()
	}

	/// Announces the new nickname in the room and switches to it, even if the announcement fails.
	pub fn change_nickname(&self, nickname: impl Into<String>) -> Reply {
		self.request(|reply| Command::ChangeNickname {
			nickname: nickname.into(),
			reply,
		})
	}

	pub async fn leave(self) {
		let Self {
			commands, event_loop, ..
		} = self;
		drop(commands);
		if let Err(error) = event_loop.await {
			error!("Session event loop failed: {error}");
		}
	}

	fn request(&self, command: impl FnOnce(oneshot::Sender<Result<(), SessionError>>) -> Command) -> Reply {
		let (sender, receiver) = oneshot::channel();
		let _ = self.commands.send(command(sender));
		Reply { receiver }
	}
}

/// Outcome of a session command, the command itself is already on its way when this is created.
#[must_use = "dropping the reply does not cancel the command, but its outcome is lost"]
pub struct Reply {
	receiver: oneshot::Receiver<Result<(), SessionError>>,
}

impl IntoFuture for Reply {
	type Output = Result<(), SessionError>;
	type IntoFuture = BoxFuture<'static, Self::Output>;

	fn into_future(self) -> Self::IntoFuture {
		self.receiver.map(|result| result.unwrap_or(Err(SessionError::Closed))).boxed()
	}
}

type ReplySender = oneshot::Sender<Result<(), SessionError>>;

enum Command {
	EditDraft(String),
	SubmitNickname { nickname: String, reply: ReplySender },
	SubmitDraft { reply: ReplySender },
	ChangeNickname { nickname: String, reply: ReplySender },
}

enum Completion {
	Send {
		result: Result<Message, StoreError>,
		reply: ReplySender,
	},
	NicknameChange {
		nickname: String,
		result: Result<Message, StoreError>,
		reply: ReplySender,
	},
}

struct EventLoop {
	backend: Arc<dyn Backend>,
	identity: Arc<dyn Identity>,
	state: watch::Sender<SessionState>,
	subscription: Subscription,
	commands: mpsc::UnboundedReceiver<Command>,
	in_flight: FuturesUnordered<BoxFuture<'static, Completion>>,
}

impl EventLoop {
	async fn run(mut self) {
		let room_id = self.subscription.room_id();
		let mut feed_open = true;
		debug!(%room_id, "Entered session.");

		loop {
			tokio::select! {
				command = self.commands.recv() => match command {
					Some(command) => self.handle_command(command),
					None => break,
				},
				delivery = self.subscription.next(), if feed_open => match delivery {
					Some(message) => self.update(|state| state.append(message)),
					None => {
						warn!(%room_id, "Change feed ended, no more live updates for this session.");
						feed_open = false;
					}
				},
				Some(completion) = self.in_flight.next(), if !self.in_flight.is_empty() => self.complete(completion),
			}
		}

		self.subscription.close();
		debug!(%room_id, discarded = self.in_flight.len(), "Left session.");
	}

	fn handle_command(&mut self, command: Command) {
		use Command::*;
		match command {
			EditDraft(draft) => self.update(|state| state.set_draft(draft)),
			SubmitNickname { nickname, reply } => {
				let result = self.update(|state| state.submit_nickname(&nickname));
				let result = result.map(|nickname| self.persist_nickname(&nickname));
				let _ = reply.send(result.map_err(Into::into));
			}
			SubmitDraft { reply } => match self.update(SessionState::begin_send) {
				Ok(new_message) => {
					let backend = self.backend.clone();
					self.in_flight.push(
						async move {
							let result = backend.create_message(new_message).await;
							Completion::Send { result, reply }
						}
						.boxed(),
					);
				}
				Err(error) => {
					let _ = reply.send(Err(error.into()));
				}
			},
			ChangeNickname { nickname, reply } => {
				let change = self.state.borrow().begin_nickname_change(&nickname);
				match change {
					Ok((announcement, nickname)) => self.insert_announcement(announcement, nickname, reply),
					Err(error) => {
						let _ = reply.send(Err(error.into()));
					}
				}
			}
		}
	}

	fn insert_announcement(&mut self, announcement: NewMessage, nickname: String, reply: ReplySender) {
		let backend = self.backend.clone();
		self.in_flight.push(
			async move {
				let result = backend.create_message(announcement).await;
				Completion::NicknameChange {
					nickname,
					result,
					reply,
				}
			}
			.boxed(),
		);
	}

	fn complete(&mut self, completion: Completion) {
		use Completion::*;
		match completion {
			Send { result, reply } => {
				self.update(|state| state.finish_send(result.is_ok()));
				if let Err(error) = &result {
					error!("Error sending message: {error}");
				}
				let _ = reply.send(result.map(drop).map_err(Into::into));
			}
			NicknameChange {
				nickname,
				result,
				reply,
			} => {
				if let Err(error) = &result {
					error!("Error announcing nickname change: {error}");
				}
				self.persist_nickname(&nickname);
				self.update(|state| state.finish_nickname_change(nickname));
				let _ = reply.send(result.map(drop).map_err(Into::into));
			}
		}
	}

	fn persist_nickname(&self, nickname: &str) {
		if let Err(error) = self.identity.set_nickname(nickname) {
			warn!("Nickname '{nickname}' is only kept for this session: {error}");
		}
	}

	fn update<Output>(&self, operation: impl FnOnce(&mut SessionState) -> Output) -> Output {
		let mut output = None;
		self.state.send_modify(|state| output = Some(operation(state)));
		output.unwrap_or_else(|| unreachable!("send_modify always runs the modification"))
	}
}
