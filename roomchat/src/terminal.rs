use crate::backend::Backend;
use crate::directory::{CreateRoomForm, Directory};
use crate::identity::Identity;
use crate::message::model::Message;
use crate::room::model::Room;
use crate::route::{Page, Route, resolve};
use crate::session::state::{Alignment, Entry, Phase, SessionState};
use crate::session::{Reply, SessionError, SessionView};
use futures_util::future::BoxFuture;
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::fmt::Write as _;
use std::future::IntoFuture;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::error;

/// Columns available for aligning messages.
pub const WIDTH: usize = 72;

#[derive(Error, Debug)]
pub enum TerminalError {
	#[error("Terminal IO failed: {0}")]
	Io(#[from] std::io::Error),
}

/// Line based client: shows a route, reads commands from `input` and writes everything to `output`.
///
/// Store errors are shown and never end the client, only failing IO does.
pub struct Terminal<Input, Output> {
	input: Lines<Input>,
	output: Output,
	backend: Arc<dyn Backend>,
	identity: Arc<dyn Identity>,
}

impl<Input, Output> Terminal<Input, Output>
where
	Input: AsyncBufRead + Unpin,
	Output: AsyncWrite + Unpin,
{
	pub fn new(input: Input, output: Output, backend: Arc<dyn Backend>, identity: Arc<dyn Identity>) -> Self {
		Self {
			input: input.lines(),
			output,
			backend,
			identity,
		}
	}

	/// Navigates from `route` until the user quits or the input ends.
	pub async fn run(mut self, mut route: Route) -> Result<(), TerminalError> {
		loop {
			let page = match resolve(self.backend.as_ref(), &route).await {
				Ok(page) => page,
				Err(error) => {
					error!(%route, "Error loading page: {error}");
					self.write(&format!("Could not load {route}: {error}\n")).await?;
					match route {
						Route::Directory => Page::Directory(Vec::new()),
						Route::Room(_) | Route::NotFound(_) => Page::NotFound,
					}
				}
			};
			let next = match page {
				Page::Directory(rooms) => self.directory(&rooms).await?,
				Page::Session { room, messages } => self.session(room, messages).await?,
				Page::NotFound => self.not_found(&route).await?,
			};

			match next {
				Some(next) => route = next,
				None => return Ok(()),
			}
		}
	}

	async fn directory(&mut self, rooms: &[Room]) -> Result<Option<Route>, TerminalError> {
		self.write(&render_directory(rooms)).await?;

		let directory = Directory::new(self.backend.clone());
		let mut form = CreateRoomForm::default();
		while let Some(line) = self.input.next_line().await? {
			let line = line.trim();
			if let Some(name) = line.strip_prefix("create ") {
				form.edit(name);
				match form.submit(&directory).await {
					Ok(route) => return Ok(Some(route)),
					Err(error) => self.write(&format!("{error}\n")).await?,
				}
			} else if let Some(navigation) = navigation(line) {
				return Ok(navigation);
			} else if !line.is_empty() {
				self.write("Commands: create <name>, open <path>, quit\n").await?;
			}
		}

		Ok(None)
	}

	async fn not_found(&mut self, route: &Route) -> Result<Option<Route>, TerminalError> {
		self.write(&render_not_found(route)).await?;

		while let Some(line) = self.input.next_line().await? {
			if let Some(navigation) = navigation(line.trim()) {
				return Ok(navigation);
			}
		}

		Ok(None)
	}

	/// Stays in the room until `/quit` or the end of the input. Sends still in flight when the input ends are awaited.
	async fn session(&mut self, room: Room, messages: Vec<Message>) -> Result<Option<Route>, TerminalError> {
		let room_id = room.id;
		let session = match SessionView::open(self.backend.clone(), self.identity.clone(), room, messages).await {
			Ok(session) => session,
			Err(error) => {
				error!(%room_id, "Error entering room: {error}");
				self.write(&format!("Could not enter the room: {error}\n")).await?;
				return Ok(Some(Route::Directory));
			}
		};
		let mut state = session.watch();
		let mut pending = FuturesUnordered::<BoxFuture<'static, Result<(), SessionError>>>::new();

		let (header, mut shown, mut nickname) = {
			let state = state.borrow_and_update();
			let nickname = state.nickname().map(ToString::to_string);
			(render_session(&state), state.messages().len(), nickname)
		};
		self.write(&header).await?;

		let next = loop {
			tokio::select! {
				line = self.input.next_line() => {
					let Some(line) = line? else {
						while let Some(result) = pending.next().await {
							self.report(result).await?;
						}
						break None;
					};
					let line = line.trim();
					if line == "/quit" {
						break Some(Route::Directory);
					}
					if *session.state().phase() == Phase::AwaitingNickname {
						let feedback = choose_nickname(&session, line).await;
						self.write(&feedback).await?;
					} else {
						pending.push(submit(&session, line).into_future());
					}
				}
				Some(result) = pending.next(), if !pending.is_empty() => self.report(result).await?,
				changed = state.changed() => {
					if changed.is_err() {
						break None;
					}
					// A new nickname can flip the alignment of earlier bubbles.
					let text = {
						let state = state.borrow_and_update();
						let text = if state.nickname() == nickname.as_deref() {
							render_entries(&state, shown)
						} else {
							nickname = state.nickname().map(ToString::to_string);
							render_session(&state)
						};
						shown = state.messages().len();
						text
					};
					self.write(&text).await?;
				}
			}
		};

		session.leave().await;
		Ok(next)
	}

	async fn report(&mut self, result: Result<(), SessionError>) -> std::io::Result<()> {
		match result {
			Ok(()) => Ok(()),
			Err(error) => self.write(&format!("{error}\n")).await,
		}
	}

	async fn write(&mut self, text: &str) -> std::io::Result<()> {
		self.output.write_all(text.as_bytes()).await?;
		self.output.flush().await
	}
}

/// Until a nickname was chosen every line picks one, `/nick <name>` included.
async fn choose_nickname(session: &SessionView, line: &str) -> String {
	let nickname = nickname_argument(line).unwrap_or(line);
	match session.submit_nickname(nickname).await {
		Ok(()) => {
			let nickname = session.state().nickname().unwrap_or_default().to_string();
			format!("You are {nickname}.\n")
		}
		Err(error) => format!("{error}\n"),
	}
}

/// `/nick <name>` changes the nickname, other lines are sent as messages.
fn submit(session: &SessionView, line: &str) -> Reply {
	match nickname_argument(line) {
		Some(nickname) => session.change_nickname(nickname),
		None => session.send(line),
	}
}

fn nickname_argument(line: &str) -> Option<&str> {
	if line == "/nick" {
		Some("")
	} else {
		line.strip_prefix("/nick ")
	}
}

/// `open <path>` navigates, `quit` ends the client.
fn navigation(line: &str) -> Option<Option<Route>> {
	if line == "quit" {
		return Some(None);
	}
	line.strip_prefix("open ").map(|path| Some(Route::parse(path.trim())))
}

pub fn render_directory(rooms: &[Room]) -> String {
	let mut text = String::from("Rooms\n");
	if rooms.is_empty() {
		text.push_str("  No rooms yet. Create one with: create <name>\n");
	}
	for room in rooms {
		let _ = writeln!(text, "  {}  {}", room.name, Route::from(room));
	}
	text
}

pub fn render_not_found(route: &Route) -> String {
	format!("Nothing here at {route}.\nBack to the rooms: open {}\n", Route::Directory)
}

pub fn render_session(state: &SessionState) -> String {
	let mut text = format!("# {}\n", state.room().name);
	text.push_str(&render_entries(state, 0));
	if let Phase::AwaitingNickname = state.phase() {
		text.push_str("Choose a nickname to start chatting:\n");
	}
	text
}

/// Renders the entries from index `from` on.
pub fn render_entries(state: &SessionState, from: usize) -> String {
	state.entries().skip(from).fold(String::new(), |mut text, entry| {
		text.push_str(&render_entry(entry));
		text.push('\n');
		text
	})
}

pub fn render_entry(entry: Entry<'_>) -> String {
	match entry {
		Entry::Announcement(message) => format!("{:^WIDTH$}", format!("~ {} ~", message.content)),
		Entry::Bubble { message, alignment } => {
			let bubble = format!(
				"[{}] {}: {}",
				message.created_at.local_time_of_day(),
				message.nickname,
				message.content
			);
			match alignment {
				Alignment::Left => bubble,
				Alignment::Right => format!("{bubble:>WIDTH$}"),
			}
		}
	}
}
