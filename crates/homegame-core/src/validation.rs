//! Input validation applied before any write reaches storage.

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::Amount;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required")]
    EmptyName,

    #[error("Date is required")]
    MissingDate,

    #[error("Invalid date '{0}': expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate(String),

    #[error("At least one player is required")]
    EmptyRoster,

    #[error("Player ID is required")]
    MissingPlayerId,

    #[error("Amount must be greater than 0 (got {0})")]
    NonPositiveAmount(Amount),

    #[error("Amount must not exceed {max} (got {0})", max = MAX_AMOUNT)]
    AmountTooLarge(Amount),

    #[error("Amount must have at most {scale} decimal places (got {0})", scale = AMOUNT_SCALE)]
    TooManyDecimalPlaces(Amount),
}

/// Largest amount a single buy-in or cash-out may carry.
pub const MAX_AMOUNT: Amount = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Decimal places a recorded amount may carry (cents).
pub const AMOUNT_SCALE: u32 = 2;

/// Trim a required display name, rejecting blank input.
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank collapses to `None`.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Accept a positive amount of at most [`MAX_AMOUNT`] with at most
/// [`AMOUNT_SCALE`] decimal places, normalized (`100.50` becomes `100.5`).
///
/// With these bounds any realistic number of entries sums exactly.
pub fn validate_amount(amount: Amount) -> Result<Amount, ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(amount));
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge(amount));
    }
    let amount = amount.normalize();
    if amount.scale() > AMOUNT_SCALE {
        return Err(ValidationError::TooManyDecimalPlaces(amount));
    }
    Ok(amount)
}

pub fn validate_player_id(player_id: &str) -> Result<&str, ValidationError> {
    let trimmed = player_id.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingPlayerId);
    }
    Ok(trimmed)
}

/// Parse a session date from `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_session_date(input: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingDate);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
}

/// Deduplicate a roster while keeping first-seen order. Rejects an empty list.
pub fn normalize_roster<S: AsRef<str>>(player_ids: &[S]) -> Result<Vec<String>, ValidationError> {
    let mut roster: Vec<String> = Vec::with_capacity(player_ids.len());
    for id in player_ids {
        let id = validate_player_id(id.as_ref())?;
        if !roster.iter().any(|existing| existing == id) {
            roster.push(id.to_string());
        }
    }

    if roster.is_empty() {
        return Err(ValidationError::EmptyRoster);
    }

    Ok(roster)
}
