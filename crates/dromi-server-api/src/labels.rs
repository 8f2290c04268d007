// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use dromi_server_db::{ItemLabelValue, LabelType, LabelWithValues, NewLabelValue, TodoLabelValue};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabelTypeApi {
	Select,
	MultiSelect,
	Text,
	Number,
	Date,
}

impl From<LabelType> for LabelTypeApi {
	fn from(t: LabelType) -> Self {
		match t {
			LabelType::Select => Self::Select,
			LabelType::MultiSelect => Self::MultiSelect,
			LabelType::Text => Self::Text,
			LabelType::Number => Self::Number,
			LabelType::Date => Self::Date,
		}
	}
}

impl From<LabelTypeApi> for LabelType {
	fn from(t: LabelTypeApi) -> Self {
		match t {
			LabelTypeApi::Select => Self::Select,
			LabelTypeApi::MultiSelect => Self::MultiSelect,
			LabelTypeApi::Text => Self::Text,
			LabelTypeApi::Number => Self::Number,
			LabelTypeApi::Date => Self::Date,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LabelValueInput {
	pub name: String,
	/// `#rrggbb`.
	pub color: String,
	#[serde(default)]
	pub description: Option<String>,
}

impl From<LabelValueInput> for NewLabelValue {
	fn from(input: LabelValueInput) -> Self {
		Self {
			name: input.name,
			color: input.color,
			description: input.description,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateLabelRequest {
	pub name: String,
	#[serde(default)]
	pub description: Option<String>,
	/// Defaults to `SELECT`.
	#[serde(rename = "type", default)]
	pub label_type: Option<LabelTypeApi>,
	#[serde(default)]
	pub values: Option<Vec<LabelValueInput>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateLabelRequest {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ReplaceLabelValuesRequest {
	pub values: Vec<LabelValueInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LabelValueResponse {
	pub id: String,
	pub label_id: String,
	pub name: String,
	pub color: String,
	pub description: Option<String>,
	pub position: i64,
	pub created_at: DateTime<Utc>,
}

impl From<&TodoLabelValue> for LabelValueResponse {
	fn from(v: &TodoLabelValue) -> Self {
		Self {
			id: v.id.to_string(),
			label_id: v.label_id.to_string(),
			name: v.name.clone(),
			color: v.color.clone(),
			description: v.description.clone(),
			position: v.position,
			created_at: v.created_at,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LabelResponse {
	pub id: String,
	pub list_id: String,
	pub name: String,
	pub description: Option<String>,
	#[serde(rename = "type")]
	pub label_type: LabelTypeApi,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	/// Ordered by position.
	pub values: Vec<LabelValueResponse>,
}

impl From<&LabelWithValues> for LabelResponse {
	fn from(l: &LabelWithValues) -> Self {
		Self {
			id: l.label.id.to_string(),
			list_id: l.label.list_id.to_string(),
			name: l.label.name.clone(),
			description: l.label.description.clone(),
			label_type: l.label.label_type.into(),
			created_at: l.label.created_at,
			updated_at: l.label.updated_at,
			values: l.values.iter().map(LabelValueResponse::from).collect(),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ListLabelsResponse {
	pub success: bool,
	pub labels: Vec<LabelResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LabelEnvelope {
	pub success: bool,
	pub label: LabelResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ApplyLabelValueRequest {
	pub label_value_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ItemLabelValueResponse {
	pub id: String,
	pub item_id: String,
	pub label_value_id: String,
	pub created_at: DateTime<Utc>,
}

impl From<&ItemLabelValue> for ItemLabelValueResponse {
	fn from(v: &ItemLabelValue) -> Self {
		Self {
			id: v.id.to_string(),
			item_id: v.item_id.to_string(),
			label_value_id: v.label_value_id.to_string(),
			created_at: v.created_at,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ItemLabelValueEnvelope {
	pub success: bool,
	pub label_value: ItemLabelValueResponse,
}
