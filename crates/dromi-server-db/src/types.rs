// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Column encoding helpers shared by the repositories.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::DbError;

/// Encode a timestamp as fixed-width RFC 3339, so stored values sort in time order.
pub(crate) fn encode_ts(ts: &DateTime<Utc>) -> String {
	ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_ts(raw: &str, column: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(raw)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("Invalid {column} timestamp: {e}")))
}

pub(crate) fn decode_opt_ts(
	raw: Option<String>,
	column: &str,
) -> Result<Option<DateTime<Utc>>, DbError> {
	raw.map(|s| decode_ts(&s, column)).transpose()
}
