use parking_lot::Mutex;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key under which the nickname is kept.
pub const NICKNAME_KEY: &str = "chat-nickname";

/// Client-wide storage of the nickname a client presents with its messages.
///
/// Nothing about the nickname is validated or unique, it is whatever the user typed last.
pub trait Identity: Send + Sync {
	fn nickname(&self) -> Option<String>;
	fn set_nickname(&self, nickname: &str) -> Result<(), IdentityError>;
}

#[derive(Error, Debug)]
pub enum IdentityError {
	#[error("Failed to persist nickname: {0}")]
	Io(#[from] std::io::Error),
}

#[derive(Default)]
pub struct MemoryIdentity {
	nickname: Mutex<Option<String>>,
}

impl MemoryIdentity {
	pub fn with_nickname(nickname: &str) -> Self {
		Self {
			nickname: Mutex::new(Some(nickname.to_string())),
		}
	}
}

impl Identity for MemoryIdentity {
	fn nickname(&self) -> Option<String> {
		self.nickname.lock().clone()
	}

	fn set_nickname(&self, nickname: &str) -> Result<(), IdentityError> {
		*self.nickname.lock() = Some(nickname.to_string());
		Ok(())
	}
}

/// Keeps the nickname in a file named after [`NICKNAME_KEY`] inside a directory.
pub struct FileIdentity {
	path: PathBuf,
}

impl FileIdentity {
	pub fn new(directory: impl AsRef<Path>) -> Self {
		Self {
			path: directory.as_ref().join(NICKNAME_KEY),
		}
	}
}

impl Identity for FileIdentity {
	fn nickname(&self) -> Option<String> {
		match fs::read_to_string(&self.path) {
			Ok(nickname) if !nickname.trim().is_empty() => Some(nickname.trim().to_string()),
			Ok(_) => None,
			Err(error) => {
				if error.kind() != ErrorKind::NotFound {
					tracing::warn!("Failed to read nickname from '{}': {error}", self.path.display());
				}
				None
			}
		}
	}

	fn set_nickname(&self, nickname: &str) -> Result<(), IdentityError> {
		if let Some(directory) = self.path.parent() {
			fs::create_dir_all(directory)?;
		}
		fs::write(&self.path, nickname)?;
		Ok(())
	}
}
