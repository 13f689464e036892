// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Input validation errors raised at the text-entry boundary.

use thiserror::Error;

/// Text entered for a temperature could not be turned into a usable number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid input. Please enter a valid number. (empty input)")]
    Empty,

    #[error("Invalid input. Please enter a valid number. ('{0}' is not a number)")]
    NotANumber(String),

    #[error("Invalid input. Please enter a valid number. ('{0}' is not finite)")]
    NotFinite(String),
}

/// Parse a temperature typed by the user.
///
/// Surrounding whitespace is ignored. NaN and infinities parse as floats in
/// Rust but are rejected here.
pub fn parse_temperature(text: &str) -> Result<f64, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let value: f64 = trimmed
        .parse()
        .map_err(|_| ParseError::NotANumber(trimmed.to_string()))?;

    if !value.is_finite() {
        return Err(ParseError::NotFinite(trimmed.to_string()));
    }
    Ok(value)
}
