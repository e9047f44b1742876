use crate::store::error::StoreError;
use crate::validation::ValidationError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Type-erased error response
///
/// NOTE: This type is inspired by RFC7807 (Problem Details for HTTP APIs) but spares on a lot of
/// the details to avoid complexity.
///
/// See: <https://www.rfc-editor.org/rfc/rfc7807.html>
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ApiErrorResponse {
	pub r#type: String,
	pub status: u16,
	pub message: String,
}

impl ApiErrorResponse {
	fn new(r#type: &str, status: StatusCode, message: impl Into<String>) -> Self {
		Self {
			r#type: r#type.to_string(),
			status: status.as_u16(),
			message: message.into(),
		}
	}

	pub fn room_not_found() -> Self {
		Self::new("room-not-found", StatusCode::NOT_FOUND, "Room not found.")
	}
}

impl IntoResponse for ApiErrorResponse {
	fn into_response(self) -> Response {
		let status_code = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		(status_code, Json(self)).into_response()
	}
}

impl From<ValidationError> for ApiErrorResponse {
	fn from(error: ValidationError) -> Self {
		use ValidationError::*;
		let r#type = match error {
			EmptyRoomName => "room-name-empty",
			EmptyContent => "message-content-empty",
			EmptyNickname | NicknameRequired => "nickname-empty",
			SendInFlight => "send-in-flight",
		};
		Self::new(r#type, StatusCode::BAD_REQUEST, error.to_string())
	}
}

impl From<StoreError> for ApiErrorResponse {
	fn from(error: StoreError) -> Self {
		use StoreError::*;
		match error {
			NotFound | ForeignKeyViolation(_) => Self::room_not_found(),
			ConstraintViolation(_) => Self::new("constraint-violation", StatusCode::BAD_REQUEST, error.to_string()),
			error => {
				error!("Store call failed: {error}");
				Self::new(
					"store-error",
					StatusCode::INTERNAL_SERVER_ERROR,
					"The store failed to process the request.",
				)
			}
		}
	}
}
