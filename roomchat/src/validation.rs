use thiserror::Error;

/// Input rejected on the client side, before any store call was made.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
	#[error("Room name must not be empty.")]
	EmptyRoomName,
	#[error("Message must not be empty.")]
	EmptyContent,
	#[error("Nickname must not be empty.")]
	EmptyNickname,
	#[error("A nickname is required before sending messages.")]
	NicknameRequired,
	#[error("The previous message is still being sent.")]
	SendInFlight,
}

/// Trims `text`, rejecting it with `error` if nothing remains.
pub fn non_blank(text: &str, error: ValidationError) -> Result<&str, ValidationError> {
	let trimmed = text.trim();
	if trimmed.is_empty() {
		return Err(error);
	}

	Ok(trimmed)
}
