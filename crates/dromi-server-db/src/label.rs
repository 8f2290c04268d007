// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Label repository.
//!
//! Labels are defined per todo list. `SELECT` and `MULTI_SELECT` labels carry an
//! ordered set of values; items pick values from them. A `SELECT` label allows at
//! most one of its values per item.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dromi_server_auth::{ItemLabelValueId, TodoItemId, TodoLabelId, TodoLabelValueId, TodoListId};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqlitePool, Row, Sqlite, Transaction};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::DbError;
use crate::types::{decode_ts, encode_ts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabelType {
	#[default]
	Select,
	MultiSelect,
	Text,
	Number,
	Date,
}

impl LabelType {
	pub fn as_str(&self) -> &'static str {
		match self {
			LabelType::Select => "SELECT",
			LabelType::MultiSelect => "MULTI_SELECT",
			LabelType::Text => "TEXT",
			LabelType::Number => "NUMBER",
			LabelType::Date => "DATE",
		}
	}

	/// Whether the label picks from a fixed set of values.
	pub fn has_values(&self) -> bool {
		matches!(self, LabelType::Select | LabelType::MultiSelect)
	}
}

impl fmt::Display for LabelType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for LabelType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"SELECT" => Ok(LabelType::Select),
			"MULTI_SELECT" => Ok(LabelType::MultiSelect),
			"TEXT" => Ok(LabelType::Text),
			"NUMBER" => Ok(LabelType::Number),
			"DATE" => Ok(LabelType::Date),
			other => Err(format!("unknown label type: {other}")),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoLabel {
	pub id: TodoLabelId,
	pub list_id: TodoListId,
	pub name: String,
	pub description: Option<String>,
	pub label_type: LabelType,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl TodoLabel {
	pub fn new(list_id: TodoListId, name: impl Into<String>, label_type: LabelType) -> Self {
		let now = Utc::now();
		Self {
			id: TodoLabelId::generate(),
			list_id,
			name: name.into(),
			description: None,
			label_type,
			created_at: now,
			updated_at: now,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoLabelValue {
	pub id: TodoLabelValueId,
	pub label_id: TodoLabelId,
	pub name: String,
	pub color: String,
	pub description: Option<String>,
	pub position: i64,
	pub created_at: DateTime<Utc>,
}

/// Input for one label value; ids and positions are assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLabelValue {
	pub name: String,
	pub color: String,
	pub description: Option<String>,
}

/// A label with its values ordered by position.
#[derive(Debug, Clone)]
pub struct LabelWithValues {
	pub label: TodoLabel,
	pub values: Vec<TodoLabelValue>,
}

/// A label value applied to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLabelValue {
	pub id: ItemLabelValueId,
	pub item_id: TodoItemId,
	pub label_value_id: TodoLabelValueId,
	pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait LabelStore: Send + Sync {
	async fn create_label(
		&self,
		label: &TodoLabel,
		values: &[NewLabelValue],
	) -> Result<LabelWithValues, DbError>;
	async fn get_label(
		&self,
		list_id: &TodoListId,
		label_id: &TodoLabelId,
	) -> Result<Option<LabelWithValues>, DbError>;
	async fn list_labels(&self, list_id: &TodoListId) -> Result<Vec<LabelWithValues>, DbError>;
	async fn update_label(&self, label: &TodoLabel) -> Result<(), DbError>;
	async fn delete_label(&self, label_id: &TodoLabelId) -> Result<bool, DbError>;
	async fn replace_label_values(
		&self,
		label_id: &TodoLabelId,
		values: &[NewLabelValue],
	) -> Result<Vec<TodoLabelValue>, DbError>;
	async fn get_label_value_in_list(
		&self,
		list_id: &TodoListId,
		value_id: &TodoLabelValueId,
	) -> Result<Option<(TodoLabel, TodoLabelValue)>, DbError>;
	async fn apply_label_value(
		&self,
		item_id: &TodoItemId,
		label: &TodoLabel,
		value: &TodoLabelValue,
	) -> Result<ItemLabelValue, DbError>;
	async fn remove_label_value(
		&self,
		item_id: &TodoItemId,
		value_id: &TodoLabelValueId,
	) -> Result<bool, DbError>;
	async fn list_item_label_values(&self, item_id: &TodoItemId) -> Result<Vec<ItemLabelValue>, DbError>;
}

#[async_trait]
impl LabelStore for LabelRepository {
	async fn create_label(
		&self,
		label: &TodoLabel,
		values: &[NewLabelValue],
	) -> Result<LabelWithValues, DbError> {
		self.create_label(label, values).await
	}

	async fn get_label(
		&self,
		list_id: &TodoListId,
		label_id: &TodoLabelId,
	) -> Result<Option<LabelWithValues>, DbError> {
		self.get_label(list_id, label_id).await
	}

	async fn list_labels(&self, list_id: &TodoListId) -> Result<Vec<LabelWithValues>, DbError> {
		self.list_labels(list_id).await
	}

	async fn update_label(&self, label: &TodoLabel) -> Result<(), DbError> {
		self.update_label(label).await
	}

	async fn delete_label(&self, label_id: &TodoLabelId) -> Result<bool, DbError> {
		self.delete_label(label_id).await
	}

	async fn replace_label_values(
		&self,
		label_id: &TodoLabelId,
		values: &[NewLabelValue],
	) -> Result<Vec<TodoLabelValue>, DbError> {
		self.replace_label_values(label_id, values).await
	}

	async fn get_label_value_in_list(
		&self,
		list_id: &TodoListId,
		value_id: &TodoLabelValueId,
	) -> Result<Option<(TodoLabel, TodoLabelValue)>, DbError> {
		self.get_label_value_in_list(list_id, value_id).await
	}

	async fn apply_label_value(
		&self,
		item_id: &TodoItemId,
		label: &TodoLabel,
		value: &TodoLabelValue,
	) -> Result<ItemLabelValue, DbError> {
		self.apply_label_value(item_id, label, value).await
	}

	async fn remove_label_value(
		&self,
		item_id: &TodoItemId,
		value_id: &TodoLabelValueId,
	) -> Result<bool, DbError> {
		self.remove_label_value(item_id, value_id).await
	}

	async fn list_item_label_values(&self, item_id: &TodoItemId) -> Result<Vec<ItemLabelValue>, DbError> {
		self.list_item_label_values(item_id).await
	}
}

/// Repository for labels, label values and their item attachments.
#[derive(Clone)]
pub struct LabelRepository {
	pool: SqlitePool,
}

impl LabelRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	// =========================================================================
	// Labels
	// =========================================================================

	/// Insert a label and its values in one transaction. Value positions follow
	/// slice order.
	#[tracing::instrument(skip(self, label, values), fields(label_id = %label.id, list_id = %label.list_id))]
	pub async fn create_label(
		&self,
		label: &TodoLabel,
		values: &[NewLabelValue],
	) -> Result<LabelWithValues, DbError> {
		let mut tx = self.pool.begin().await?;

		sqlx::query(
			r#"
			INSERT INTO todo_labels (id, list_id, name, description, type, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(label.id.as_str())
		.bind(label.list_id.as_str())
		.bind(&label.name)
		.bind(&label.description)
		.bind(label.label_type.as_str())
		.bind(encode_ts(&label.created_at))
		.bind(encode_ts(&label.updated_at))
		.execute(&mut *tx)
		.await?;

		let values = insert_values(&mut tx, &label.id, values).await?;
		tx.commit().await?;

		tracing::debug!(label_id = %label.id, values = values.len(), "todo label created");
		Ok(LabelWithValues {
			label: label.clone(),
			values,
		})
	}

	/// Fetch a label of the list with its values.
	#[tracing::instrument(skip(self), fields(list_id = %list_id, label_id = %label_id))]
	pub async fn get_label(
		&self,
		list_id: &TodoListId,
		label_id: &TodoLabelId,
	) -> Result<Option<LabelWithValues>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, list_id, name, description, type, created_at, updated_at
			FROM todo_labels
			WHERE id = ? AND list_id = ?
			"#,
		)
		.bind(label_id.as_str())
		.bind(list_id.as_str())
		.fetch_optional(&self.pool)
		.await?;

		let Some(row) = row else {
			return Ok(None);
		};
		let label = parse_label_row(&row)?;

		let value_rows = sqlx::query(
			r#"
			SELECT id, label_id, name, color, description, position, created_at
			FROM todo_label_values
			WHERE label_id = ?
			ORDER BY position, id
			"#,
		)
		.bind(label.id.as_str())
		.fetch_all(&self.pool)
		.await?;

		let values = value_rows
			.iter()
			.map(parse_value_row)
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Some(LabelWithValues { label, values }))
	}

	/// Labels of a list in creation order, each with its values by position.
	#[tracing::instrument(skip(self), fields(list_id = %list_id))]
	pub async fn list_labels(&self, list_id: &TodoListId) -> Result<Vec<LabelWithValues>, DbError> {
		let label_rows = sqlx::query(
			r#"
			SELECT id, list_id, name, description, type, created_at, updated_at
			FROM todo_labels
			WHERE list_id = ?
			ORDER BY id
			"#,
		)
		.bind(list_id.as_str())
		.fetch_all(&self.pool)
		.await?;

		let value_rows = sqlx::query(
			r#"
			SELECT v.id, v.label_id, v.name, v.color, v.description, v.position, v.created_at
			FROM todo_label_values v
			JOIN todo_labels l ON l.id = v.label_id
			WHERE l.list_id = ?
			ORDER BY v.position, v.id
			"#,
		)
		.bind(list_id.as_str())
		.fetch_all(&self.pool)
		.await?;

		let mut by_label: HashMap<TodoLabelId, Vec<TodoLabelValue>> = HashMap::new();
		for row in &value_rows {
			let value = parse_value_row(row)?;
			by_label.entry(value.label_id.clone()).or_default().push(value);
		}

		label_rows
			.iter()
			.map(|row| {
				let label = parse_label_row(row)?;
				let values = by_label.remove(&label.id).unwrap_or_default();
				Ok(LabelWithValues { label, values })
			})
			.collect()
	}

	/// Persist a label's name and description.
	#[tracing::instrument(skip(self, label), fields(label_id = %label.id))]
	pub async fn update_label(&self, label: &TodoLabel) -> Result<(), DbError> {
		let result = sqlx::query(
			r#"
			UPDATE todo_labels
			SET name = ?, description = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&label.name)
		.bind(&label.description)
		.bind(encode_ts(&label.updated_at))
		.bind(label.id.as_str())
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound("todo label".to_string()));
		}
		tracing::debug!(label_id = %label.id, "todo label updated");
		Ok(())
	}

	/// Delete a label with its values and their item attachments.
	#[tracing::instrument(skip(self), fields(label_id = %label_id))]
	pub async fn delete_label(&self, label_id: &TodoLabelId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM todo_labels WHERE id = ?")
			.bind(label_id.as_str())
			.execute(&self.pool)
			.await?;

		let deleted = result.rows_affected() > 0;
		tracing::debug!(label_id = %label_id, deleted, "todo label delete");
		Ok(deleted)
	}

	/// Replace every value of a label in one transaction.
	///
	/// Old values and their item attachments are removed. Positions restart at 0.
	#[tracing::instrument(skip(self, values), fields(label_id = %label_id, count = values.len()))]
	pub async fn replace_label_values(
		&self,
		label_id: &TodoLabelId,
		values: &[NewLabelValue],
	) -> Result<Vec<TodoLabelValue>, DbError> {
		let mut tx = self.pool.begin().await?;

		sqlx::query("DELETE FROM todo_label_values WHERE label_id = ?")
			.bind(label_id.as_str())
			.execute(&mut *tx)
			.await?;

		sqlx::query("UPDATE todo_labels SET updated_at = ? WHERE id = ?")
			.bind(encode_ts(&Utc::now()))
			.bind(label_id.as_str())
			.execute(&mut *tx)
			.await?;

		let values = insert_values(&mut tx, label_id, values).await?;
		tx.commit().await?;

		tracing::debug!(label_id = %label_id, values = values.len(), "label values replaced");
		Ok(values)
	}

	// =========================================================================
	// Item attachments
	// =========================================================================

	/// Fetch a value only if its label belongs to `list_id`.
	#[tracing::instrument(skip(self), fields(list_id = %list_id, value_id = %value_id))]
	pub async fn get_label_value_in_list(
		&self,
		list_id: &TodoListId,
		value_id: &TodoLabelValueId,
	) -> Result<Option<(TodoLabel, TodoLabelValue)>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT v.id, v.label_id, v.name, v.color, v.description, v.position, v.created_at,
				   l.list_id AS l_list_id, l.name AS l_name, l.description AS l_description,
				   l.type AS l_type, l.created_at AS l_created_at, l.updated_at AS l_updated_at
			FROM todo_label_values v
			JOIN todo_labels l ON l.id = v.label_id
			WHERE v.id = ? AND l.list_id = ?
			"#,
		)
		.bind(value_id.as_str())
		.bind(list_id.as_str())
		.fetch_optional(&self.pool)
		.await?;

		let Some(row) = row else {
			return Ok(None);
		};
		let value = parse_value_row(&row)?;

		let list_id: String = row.get("l_list_id");
		let label_type: String = row.get("l_type");
		let created_at: String = row.get("l_created_at");
		let updated_at: String = row.get("l_updated_at");
		let label = TodoLabel {
			id: value.label_id.clone(),
			list_id: TodoListId::new(list_id),
			name: row.get("l_name"),
			description: row.get("l_description"),
			label_type: label_type.parse().map_err(DbError::Internal)?,
			created_at: decode_ts(&created_at, "created_at")?,
			updated_at: decode_ts(&updated_at, "updated_at")?,
		};
		Ok(Some((label, value)))
	}

	/// Attach a value to an item.
	///
	/// For a `SELECT` label the item's other values of that label are detached
	/// first, in the same transaction.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the value is already attached.
	#[tracing::instrument(skip(self, label, value), fields(item_id = %item_id, value_id = %value.id))]
	pub async fn apply_label_value(
		&self,
		item_id: &TodoItemId,
		label: &TodoLabel,
		value: &TodoLabelValue,
	) -> Result<ItemLabelValue, DbError> {
		let applied = ItemLabelValue {
			id: ItemLabelValueId::generate(),
			item_id: item_id.clone(),
			label_value_id: value.id.clone(),
			created_at: Utc::now(),
		};

		let mut tx = self.pool.begin().await?;

		if label.label_type == LabelType::Select {
			sqlx::query(
				r#"
				DELETE FROM todo_item_label_values
				WHERE item_id = ?
				  AND label_value_id != ?
				  AND label_value_id IN (SELECT id FROM todo_label_values WHERE label_id = ?)
				"#,
			)
			.bind(item_id.as_str())
			.bind(value.id.as_str())
			.bind(label.id.as_str())
			.execute(&mut *tx)
			.await?;
		}

		sqlx::query(
			r#"
			INSERT INTO todo_item_label_values (id, item_id, label_value_id, created_at)
			VALUES (?, ?, ?, ?)
			"#,
		)
		.bind(applied.id.as_str())
		.bind(applied.item_id.as_str())
		.bind(applied.label_value_id.as_str())
		.bind(encode_ts(&applied.created_at))
		.execute(&mut *tx)
		.await
		.map_err(|e| DbError::conflict_on_unique(e, "label value already applied"))?;

		tx.commit().await?;

		tracing::debug!(item_id = %item_id, value_id = %value.id, "label value applied");
		Ok(applied)
	}

	/// Detach a value from an item. Returns `false` if it was not attached.
	#[tracing::instrument(skip(self), fields(item_id = %item_id, value_id = %value_id))]
	pub async fn remove_label_value(
		&self,
		item_id: &TodoItemId,
		value_id: &TodoLabelValueId,
	) -> Result<bool, DbError> {
		let result = sqlx::query(
			"DELETE FROM todo_item_label_values WHERE item_id = ? AND label_value_id = ?",
		)
		.bind(item_id.as_str())
		.bind(value_id.as_str())
		.execute(&self.pool)
		.await?;

		let removed = result.rows_affected() > 0;
		tracing::debug!(item_id = %item_id, removed, "label value remove");
		Ok(removed)
	}

	#[tracing::instrument(skip(self), fields(item_id = %item_id))]
	pub async fn list_item_label_values(&self, item_id: &TodoItemId) -> Result<Vec<ItemLabelValue>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, item_id, label_value_id, created_at
			FROM todo_item_label_values
			WHERE item_id = ?
			ORDER BY id
			"#,
		)
		.bind(item_id.as_str())
		.fetch_all(&self.pool)
		.await?;

		rows
			.iter()
			.map(|row| {
				let id: String = row.get("id");
				let item_id: String = row.get("item_id");
				let label_value_id: String = row.get("label_value_id");
				let created_at: String = row.get("created_at");
				Ok(ItemLabelValue {
					id: ItemLabelValueId::new(id),
					item_id: TodoItemId::new(item_id),
					label_value_id: TodoLabelValueId::new(label_value_id),
					created_at: decode_ts(&created_at, "created_at")?,
				})
			})
			.collect()
	}
}

async fn insert_values(
	tx: &mut Transaction<'_, Sqlite>,
	label_id: &TodoLabelId,
	values: &[NewLabelValue],
) -> Result<Vec<TodoLabelValue>, DbError> {
	let now = Utc::now();
	let mut inserted = Vec::with_capacity(values.len());

	for (position, input) in values.iter().enumerate() {
		let value = TodoLabelValue {
			id: TodoLabelValueId::generate(),
			label_id: label_id.clone(),
			name: input.name.clone(),
			color: input.color.clone(),
			description: input.description.clone(),
			position: position as i64,
			created_at: now,
		};

		sqlx::query(
			r#"
			INSERT INTO todo_label_values (id, label_id, name, color, description, position, created_at)
			VALUES (?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(value.id.as_str())
		.bind(value.label_id.as_str())
		.bind(&value.name)
		.bind(&value.color)
		.bind(&value.description)
		.bind(value.position)
		.bind(encode_ts(&value.created_at))
		.execute(&mut **tx)
		.await?;

		inserted.push(value);
	}

	Ok(inserted)
}

fn parse_label_row(row: &sqlx::sqlite::SqliteRow) -> Result<TodoLabel, DbError> {
	let id: String = row.get("id");
	let list_id: String = row.get("list_id");
	let label_type: String = row.get("type");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	Ok(TodoLabel {
		id: TodoLabelId::new(id),
		list_id: TodoListId::new(list_id),
		name: row.get("name"),
		description: row.get("description"),
		label_type: label_type.parse().map_err(DbError::Internal)?,
		created_at: decode_ts(&created_at, "created_at")?,
		updated_at: decode_ts(&updated_at, "updated_at")?,
	})
}

fn parse_value_row(row: &sqlx::sqlite::SqliteRow) -> Result<TodoLabelValue, DbError> {
	let id: String = row.get("id");
	let label_id: String = row.get("label_id");
	let created_at: String = row.get("created_at");

	Ok(TodoLabelValue {
		id: TodoLabelValueId::new(id),
		label_id: TodoLabelId::new(label_id),
		name: row.get("name"),
		color: row.get("color"),
		description: row.get("description"),
		position: row.get("position"),
		created_at: decode_ts(&created_at, "created_at")?,
	})
}
