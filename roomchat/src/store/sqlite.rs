use crate::message::model::{Message, NewMessage};
use crate::room::model::Room;
use crate::store::Store;
use crate::store::error::{IntoStoreResult, StoreError};
use crate::types::date_time::DateTime;
use crate::types::uuid::Uuid;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{SqlitePool, migrate, query_as};
use tracing::debug;


#[derive(Clone)]
pub struct SqliteStore {
	pool: SqlitePool,
}

impl SqliteStore {
	pub async fn new(database_url: &str) -> Result<Self, StoreError> {
		let mut pool_options = SqlitePoolOptions::new().idle_timeout(None).max_lifetime(None);
		// Every connection to an in-memory database would otherwise see a database of its own.
		if database_url.contains(":memory:") {
			pool_options = pool_options.max_connections(1);
		}

		let pool = pool_options
			.connect(database_url)
			.await
			.connection_error("Failed to connect to database")?;
		let store = Self { pool };
		store.migrate().await?;

		debug!("Connected to database at '{database_url}'.");
		Ok(store)
	}

	async fn migrate(&self) -> Result<(), StoreError> {
		migrate!().run(&self.pool).await.map_err(Into::into)
	}
}

#[async_trait]
impl Store for SqliteStore {
	async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
		query_as(
			r"SELECT id, name, created_at
			FROM room
			ORDER BY created_at DESC, rowid DESC",
		)
		.fetch_all(&self.pool)
		.await
		.map_err(Into::into)
	}

	async fn get_room(&self, room_id: Uuid) -> Result<Option<Room>, StoreError> {
		query_as(
			r"SELECT id, name, created_at
			FROM room
			WHERE id = ?1",
		)
		.bind(room_id)
		.fetch_optional(&self.pool)
		.await
		.map_err(Into::into)
	}

	async fn create_room(&self, name: &str) -> Result<Room, StoreError> {
		let id = Uuid::new_v4();
		query_as(
			r"INSERT INTO room(id, name, created_at) VALUES (?1, ?2, ?3)
			RETURNING
				id,
				name,
				created_at",
		)
		.bind(id)
		.bind(name)
		.bind(DateTime::now())
		.fetch_one(&self.pool)
		.await
		.map_err(Into::into)
	}

	async fn list_messages(&self, room_id: Uuid) -> Result<Vec<Message>, StoreError> {
		query_as(
			r"SELECT id, room_id, nickname, content, created_at, kind
			FROM message
			WHERE room_id = ?1
			ORDER BY created_at ASC, rowid ASC",
		)
		.bind(room_id)
		.fetch_all(&self.pool)
		.await
		.map_err(Into::into)
	}

	async fn create_message(
		&self,
		NewMessage {
			room_id,
			nickname,
			content,
			kind,
		}: NewMessage,
	) -> Result<Message, StoreError> {
		let id = Uuid::new_v4();
		query_as(
			r"INSERT INTO message(id, room_id, nickname, content, kind, created_at)
			VALUES (?1, ?2, ?3, ?4, ?5, ?6)
			RETURNING
				id,
				room_id,
				nickname,
				content,
				created_at,
				kind",
		)
		.bind(id)
		.bind(room_id)
		.bind(nickname)
		.bind(content)
		.bind(kind)
		.bind(DateTime::now())
		.fetch_one(&self.pool)
		.await
		.map_err(Into::into)
	}
}
