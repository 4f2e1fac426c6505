//! Scoped configuration overrides
//!
//! SYSTEM rows are stored with an empty `scope_id` so that the
//! (name, scope, scope_id) UNIQUE constraint also holds for them.

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use planbase_types::config_types::ConfigScope;
use planbase_types::meta_adapter::Setting;
use planbase_types::prelude::*;

use crate::utils::{collect_res, db_err, decode_enum, decode_json, none_if_empty};

const SETTING_COLUMNS: &str =
	"setting_id, name, value, scope, scope_id, version, source, updated_at, updated_by";

/// Stored form of the scope id. `None` means no row can match.
fn stored_scope_id(scope: ConfigScope, scope_id: Option<&str>) -> Option<&str> {
	match scope {
		ConfigScope::System => Some(""),
		_ => scope_id.filter(|id| !id.is_empty()),
	}
}

fn map_setting(row: &SqliteRow) -> Result<Setting, sqlx::Error> {
	Ok(Setting {
		id: row.try_get("setting_id")?,
		key: row.try_get::<String, _>("name")?.into(),
		value: decode_json(row.try_get::<&str, _>("value")?)?,
		scope: decode_enum(row.try_get::<&str, _>("scope")?)?,
		scope_id: none_if_empty(row.try_get("scope_id")?),
		version: row.try_get("version")?,
		source: row.try_get::<String, _>("source")?.into(),
		updated_at: Timestamp(row.try_get("updated_at")?),
		updated_by: row.try_get::<Option<String>, _>("updated_by")?.map(String::into_boxed_str),
	})
}

/// Read a single setting
pub(crate) async fn read(
	db: &SqlitePool,
	key: &str,
	scope: ConfigScope,
	scope_id: Option<&str>,
) -> PbResult<Option<Setting>> {
	let Some(scope_id) = stored_scope_id(scope, scope_id) else {
		return Ok(None);
	};

	let row = sqlx::query(&format!(
		"SELECT {SETTING_COLUMNS} FROM settings WHERE name = ? AND scope = ? AND scope_id = ?"
	))
	.bind(key)
	.bind(scope.as_str())
	.bind(scope_id)
	.fetch_optional(db)
	.await
	.map_err(db_err)?;

	row.as_ref().map(map_setting).transpose().map_err(db_err)
}

/// List all settings of one scope instance
pub(crate) async fn list(
	db: &SqlitePool,
	scope: ConfigScope,
	scope_id: Option<&str>,
) -> PbResult<Vec<Setting>> {
	let Some(scope_id) = stored_scope_id(scope, scope_id) else {
		return Ok(Vec::new());
	};

	let rows = sqlx::query(&format!(
		"SELECT {SETTING_COLUMNS} FROM settings WHERE scope = ? AND scope_id = ? ORDER BY name"
	))
	.bind(scope.as_str())
	.bind(scope_id)
	.fetch_all(db)
	.await
	.map_err(db_err)?;

	collect_res(rows.iter().map(map_setting))
}

/// Update or create a setting
pub(crate) async fn update(
	db: &SqlitePool,
	key: &str,
	scope: ConfigScope,
	scope_id: Option<&str>,
	value: &serde_json::Value,
	updated_by: Option<&str>,
) -> PbResult<Setting> {
	let stored_id = stored_scope_id(scope, scope_id).ok_or_else(|| {
		Error::ValidationError(format!("scope {} requires a scope id", scope))
	})?;

	let row = sqlx::query(&format!(
		"INSERT INTO settings (name, value, scope, scope_id, updated_by) VALUES (?, ?, ?, ?, ?)
		ON CONFLICT(name, scope, scope_id) DO UPDATE SET
			value = excluded.value,
			version = settings.version + 1,
			source = 'customized',
			updated_at = unixepoch(),
			updated_by = excluded.updated_by
		RETURNING {SETTING_COLUMNS}"
	))
	.bind(key)
	.bind(value.to_string())
	.bind(scope.as_str())
	.bind(stored_id)
	.bind(updated_by)
	.fetch_one(db)
	.await
	.map_err(db_err)?;

	map_setting(&row).map_err(db_err)
}

/// Delete a setting, returns whether a row was removed
pub(crate) async fn delete(
	db: &SqlitePool,
	key: &str,
	scope: ConfigScope,
	scope_id: Option<&str>,
) -> PbResult<bool> {
	let Some(scope_id) = stored_scope_id(scope, scope_id) else {
		return Ok(false);
	};

	let res = sqlx::query("DELETE FROM settings WHERE name = ? AND scope = ? AND scope_id = ?")
		.bind(key)
		.bind(scope.as_str())
		.bind(scope_id)
		.execute(db)
		.await
		.map_err(db_err)?;

	Ok(res.rows_affected() > 0)
}


// vim: ts=4
