use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::{Database, Decode, Encode};

#[derive(
	derive_more::From,
	derive_more::Into,
	derive_more::Deref,
	derive_more::DerefMut,
	Serialize,
	Deserialize,
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	PartialOrd,
	Ord,
)]
#[serde(transparent)]
pub struct DateTime(chrono::DateTime<Utc>);

impl DateTime {
	pub fn now() -> Self {
		Self(Utc::now())
	}

	/// Wall clock time of day in the local timezone, e.g. `09:41`.
	pub fn local_time_of_day(&self) -> String {
		self.0.with_timezone(&Local).format("%H:%M").to_string()
	}
}

impl<'r, Db> Decode<'r, Db> for DateTime
where
	Db: Database,
	chrono::DateTime<Utc>: Decode<'r, Db>,
{
	fn decode(value: <Db as Database>::ValueRef<'r>) -> Result<Self, BoxDynError> {
		chrono::DateTime::<Utc>::decode(value).map(DateTime)
	}
}

impl<'q, Db> Encode<'q, Db> for DateTime
where
	Db: Database,
	chrono::DateTime<Utc>: Encode<'q, Db>,
{
	fn encode_by_ref(&self, buffer: &mut <Db as Database>::ArgumentBuffer<'q>) -> Result<IsNull, BoxDynError> {
		self.0.encode_by_ref(buffer)
	}
}

impl<Db> sqlx::Type<Db> for DateTime
where
	Db: Database,
	chrono::DateTime<Utc>: sqlx::Type<Db>,
{
	fn type_info() -> Db::TypeInfo {
		chrono::DateTime::<Utc>::type_info()
	}

	fn compatible(type_info: &Db::TypeInfo) -> bool {
		chrono::DateTime::<Utc>::compatible(type_info)
	}
}
