use crate::commandline::Commandline;
use crate::error::RoomchatError;
use clap::Parser;

mod backend;
mod commandline;
mod configuration;
mod context;
mod directory;
mod error;
mod feed;
mod identity;
mod message;
mod room;
mod route;
mod server;
mod session;
mod store;
mod terminal;
mod types;
mod validation;

#[tokio::main]
async fn main() -> Result<(), RoomchatError> {
	Commandline::parse().run().await
}
