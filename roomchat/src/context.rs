use crate::backend::local::LocalBackend;
use crate::configuration::Configuration;
use crate::store::error::StoreError;
use crate::store::sqlite::SqliteStore;
use axum::extract::FromRef;
use std::sync::Arc;

#[derive(Clone, FromRef)]
pub struct ApplicationContext {
	pub configuration: Configuration,
	pub backend: LocalBackend,
}

impl ApplicationContext {
	pub async fn new(configuration: Configuration) -> Result<ApplicationContext, StoreError> {
		let store = Arc::new(SqliteStore::new(&configuration.database_url).await?);
		let backend = LocalBackend::new(store);

		Ok(Self { configuration, backend })
	}
}
