use crate::backend::Backend;
use crate::backend::remote::RemoteBackend;
use crate::configuration::Configuration;
use crate::context::ApplicationContext;
use crate::directory::Directory;
use crate::error::RoomchatError;
use crate::identity::FileIdentity;
use crate::route::Route;
use crate::server::run_server;
use crate::terminal::{Terminal, render_directory};
use std::sync::Arc;
use tokio::io::{BufReader, stdin, stdout};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser)]
#[clap(about = "Minimal multi-room chat")]
pub struct Commandline {
	#[clap(short = 'c', long = "config-file", default_value = "configuration.toml")]
	pub configuration_file_path: String,
	#[clap(subcommand)]
	pub command: Option<BaseCommand>,
}

#[derive(clap::Subcommand, Default)]
pub enum BaseCommand {
	/// Run the roomchat server
	#[default]
	Serve,
	/// Print the configuration
	Configuration,
	/// List the rooms of the server
	Rooms,
	/// Create a room and print its route
	CreateRoom { name: String },
	/// Chat in the terminal, starting at the given route
	Open {
		#[clap(default_value = "/")]
		path: String,
	},
}

impl Commandline {
	pub async fn run(self) -> Result<(), RoomchatError> {
		let configuration = Configuration::from_file(&self.configuration_file_path)?;

		// stdout belongs to the terminal client
		tracing_subscriber::fmt()
			.with_env_filter(EnvFilter::new(&configuration.log_filters))
			.with_writer(std::io::stderr)
			.init();

		let base_command = self.command.unwrap_or_default();
		match base_command {
			BaseCommand::Serve => {
				let address = configuration.address;
				let application_context = ApplicationContext::new(configuration).await?;
				info!("Starting server. The API is available at 'http://{address}/api'.");
				run_server(application_context).await?;
			}
			BaseCommand::Configuration => println!("{configuration:#?}"),
			BaseCommand::Rooms => {
				let directory = Directory::new(Arc::new(RemoteBackend::new(&configuration.server_url)?));
				print!("{}", render_directory(&directory.list_rooms().await?));
			}
			BaseCommand::CreateRoom { name } => {
				let directory = Directory::new(Arc::new(RemoteBackend::new(&configuration.server_url)?));
				let room = directory.create_room(&name).await?;
				println!("{}", Route::from(&room));
			}
			BaseCommand::Open { path } => {
				let backend: Arc<dyn Backend> = Arc::new(RemoteBackend::new(&configuration.server_url)?);
				let identity = Arc::new(FileIdentity::new(&configuration.identity_directory));
				Terminal::new(BufReader::new(stdin()), stdout(), backend, identity)
					.run(Route::parse(&path))
					.await?;
			}
		}
		Ok(())
	}
}
