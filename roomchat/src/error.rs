use crate::configuration::ConfigurationError;
use crate::directory::DirectoryError;
use crate::store::error::StoreError;
use crate::terminal::TerminalError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoomchatError {
	#[error("Failed to load configuration: {0}")]
	Configuration(#[from] ConfigurationError),
	#[error("Store failed: {0}")]
	Store(#[from] StoreError),
	#[error(transparent)]
	Directory(#[from] DirectoryError),
	#[error(transparent)]
	Terminal(#[from] TerminalError),
	#[error("IO error while serving requests: {0}")]
	Server(#[from] std::io::Error),
}
