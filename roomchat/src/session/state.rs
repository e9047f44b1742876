use crate::message::model::{Message, MessageKind, NewMessage};
use crate::room::model::Room;
use crate::validation::{ValidationError, non_blank};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
	AwaitingNickname,
	Active { nickname: String },
}

/// How a message is presented in the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entry<'message> {
	/// Nickname change, shown centered as a system notice.
	Announcement(&'message Message),
	/// Regular message, right aligned when it was written under the current nickname.
	Bubble {
		message: &'message Message,
		alignment: Alignment,
	},
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
	Left,
	Right,
}

impl<'message> Entry<'message> {
	/// Own messages are recognized by plain string equality with the current nickname, messages written
	/// under an earlier nickname count as someone else's.
	pub fn classify(message: &'message Message, current_nickname: Option<&str>) -> Self {
		match message.kind {
			MessageKind::NicknameChange => Entry::Announcement(message),
			MessageKind::Message => {
				let alignment = if current_nickname == Some(message.nickname.as_str()) {
					Alignment::Right
				} else {
					Alignment::Left
				};
				Entry::Bubble { message, alignment }
			}
		}
	}
}

/// Local state of one client's view of one room.
///
/// The message list is the initial fetch followed by every change feed delivery in arrival order.
/// Nothing is deduplicated or reordered, so under concurrent writers the list may diverge from
/// `created_at` order.
#[derive(Clone, Debug)]
pub struct SessionState {
	room: Room,
	phase: Phase,
	messages: Vec<Message>,
	draft: String,
	sending: bool,
}

impl SessionState {
	pub fn new(room: Room, initial_messages: Vec<Message>, stored_nickname: Option<String>) -> Self {
		let phase = match stored_nickname {
			Some(nickname) if !nickname.trim().is_empty() => Phase::Active { nickname },
			_ => Phase::AwaitingNickname,
		};

		Self {
			room,
			phase,
			messages: initial_messages,
			draft: String::new(),
			sending: false,
		}
	}

	pub fn room(&self) -> &Room {
		&self.room
	}

	pub fn phase(&self) -> &Phase {
		&self.phase
	}

	pub fn nickname(&self) -> Option<&str> {
		match &self.phase {
			Phase::AwaitingNickname => None,
			Phase::Active { nickname } => Some(nickname),
		}
	}

	pub fn messages(&self) -> &[Message] {
		&self.messages
	}

	pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
		let nickname = self.nickname();
		self.messages
			.iter()
			.map(move |message| Entry::classify(message, nickname))
	}

	pub fn draft(&self) -> &str {
		&self.draft
	}

	pub fn is_sending(&self) -> bool {
		self.sending
	}

	pub fn set_draft(&mut self, draft: String) {
		self.draft = draft;
	}

	pub fn append(&mut self, message: Message) {
		self.messages.push(message);
	}

	/// Passes the nickname gate, returns the nickname to persist.
	///
	/// Once active the gate is gone for good: submitting again keeps the current nickname.
	pub fn submit_nickname(&mut self, input: &str) -> Result<String, ValidationError> {
		if let Phase::Active { nickname } = &self.phase {
			debug!("Ignoring nickname submission, already active as '{nickname}'.");
			return Ok(nickname.clone());
		}

		let nickname = non_blank(input, ValidationError::EmptyNickname)?.to_string();
		self.phase = Phase::Active {
			nickname: nickname.clone(),
		};
		Ok(nickname)
	}

	/// Turns the draft into a message to insert and locks the composition until [`Self::finish_send`].
	pub fn begin_send(&mut self) -> Result<NewMessage, ValidationError> {
		let Phase::Active { nickname } = &self.phase else {
			return Err(ValidationError::NicknameRequired);
		};
		if self.sending {
			return Err(ValidationError::SendInFlight);
		}
		let content = non_blank(&self.draft, ValidationError::EmptyContent)?;

		let new_message = NewMessage::chat(self.room.id, nickname.as_str(), content);
		self.sending = true;
		Ok(new_message)
	}

	/// The draft is only cleared when the insert went through, so a failed send can be retried as is.
	pub fn finish_send(&mut self, succeeded: bool) {
		self.sending = false;
		if succeeded {
			self.draft.clear();
		}
	}

	/// Builds the announcement for a nickname change, returns it together with the trimmed new nickname.
	///
	/// The nickname itself only changes in [`Self::finish_nickname_change`].
	pub fn begin_nickname_change(&self, input: &str) -> Result<(NewMessage, String), ValidationError> {
		let Phase::Active { nickname } = &self.phase else {
			return Err(ValidationError::NicknameRequired);
		};
		let new_nickname = non_blank(input, ValidationError::EmptyNickname)?;

		let announcement = NewMessage::nickname_change(self.room.id, nickname, new_nickname);
		Ok((announcement, new_nickname.to_string()))
	}

	pub fn finish_nickname_change(&mut self, new_nickname: String) {
		self.phase = Phase::Active { nickname: new_nickname };
	}
}
