use axum::Router;
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, future};
use reqwest::{Method, RequestBuilder};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;
use tokio_tungstenite::tungstenite;

pub struct TestClient {
	server_handle: axum_server::Handle<SocketAddr>,
	client: reqwest::Client,
	server_address: SocketAddr,
}

impl TestClient {
	pub async fn new(router: Router) -> anyhow::Result<Self> {
		// NOTE: port 0 assigns a random available port
		let socket_address = SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0);

		let (bind_address, handle) = loop {
			let handle = axum_server::Handle::new();
			let server = axum_server::Server::bind(socket_address.into()).handle(handle.clone());

			tokio::spawn(server.serve(router.clone().into_make_service()));

			if let Some(address) = handle.listening().await {
				break (address, handle);
			}
		};

		let client = reqwest::Client::builder()
			.connect_timeout(Duration::from_secs(10))
			.timeout(Duration::from_secs(10))
			.build()?;

		Ok(Self {
			server_handle: handle,
			client,
			server_address: bind_address,
		})
	}

	pub fn base_url(&self) -> String {
		format!("http://{}", self.server_address)
	}

	pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
		let path = path.trim_start_matches('/');
		self.client.request(method, format!("{}/{path}", self.base_url()))
	}

	pub fn get(&self, path: &str) -> RequestBuilder {
		self.request(Method::GET, path)
	}

	pub fn post(&self, path: &str) -> RequestBuilder {
		self.request(Method::POST, path)
	}

	/// Opens a WebSocket and yields the text of every frame it receives.
	pub async fn websocket(
		&self,
		path: &str,
	) -> Result<BoxStream<'static, String>, tungstenite::Error> {
		let path = path.trim_start_matches('/');
		let url = format!("ws://{}/{path}", self.server_address);
		let (websocket, _response) = tokio_tungstenite::connect_async(url).await?;

		let texts = websocket.filter_map(|frame| {
			future::ready(match frame {
				Ok(tungstenite::Message::Text(text)) => Some(text.to_string()),
				_ => None,
			})
		});
		Ok(texts.boxed())
	}
}

impl Drop for TestClient {
	fn drop(&mut self) {
		self.server_handle.graceful_shutdown(Some(Duration::from_secs(5)));
	}
}
