use crate::types::date_time::DateTime;
use crate::types::uuid::Uuid;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(FromRow, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Room {
	pub id: Uuid,
	pub name: String,
	pub created_at: DateTime,
}
