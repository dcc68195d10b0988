// ABOUTME: Column encoding helpers shared by the database managers
// ABOUTME: Fixed-width UTC timestamps, ISO dates, UUID text and JSON text columns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Fixed-width RFC 3339 so that text comparison orders by time
pub(super) fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(super) fn decode_timestamp(value: &str, column: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid {column} timestamp '{value}': {e}")))
}

pub(super) fn encode_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(super) fn decode_date(value: &str, column: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| AppError::internal(format!("Invalid {column} date '{value}': {e}")))
}

pub(super) fn decode_uuid(value: &str, column: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| AppError::internal(format!("Invalid {column} UUID '{value}': {e}")))
}

pub(super) fn decode_json<T: DeserializeOwned>(value: &str, column: &str) -> AppResult<T> {
    serde_json::from_str(value)
        .map_err(|e| AppError::internal(format!("Invalid {column} JSON: {e}")))
}

/// SQLite integers come back as i64; reject anything outside u32
pub(super) fn decode_u32(value: i64, column: &str) -> AppResult<u32> {
    u32::try_from(value)
        .map_err(|_| AppError::internal(format!("{column} value {value} out of range")))
}
