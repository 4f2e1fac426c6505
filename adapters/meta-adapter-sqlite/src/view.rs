//! Module views and role view templates

use std::collections::HashMap;

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use planbase_types::meta_adapter::{ModuleView, RoleViewTemplate, UpdateModuleView};
use planbase_types::prelude::*;
use planbase_types::rbac::{Module, Role};

use crate::utils::{db_err, decode_enum, decode_json};

const VIEW_COLUMNS: &str =
	"view_id, org_id, member_id, module, layout, subviews_enabled, config, updated_at";
const TEMPLATE_COLUMNS: &str = "template_id, org_id, role, module, config, updated_at";

fn map_view(row: &SqliteRow) -> Result<ModuleView, sqlx::Error> {
	Ok(ModuleView {
		id: row.try_get("view_id")?,
		organization_id: row.try_get::<String, _>("org_id")?.into(),
		member_id: row.try_get::<String, _>("member_id")?.into(),
		module: decode_enum(row.try_get::<&str, _>("module")?)?,
		layout: row.try_get::<Option<String>, _>("layout")?.map(String::into_boxed_str),
		subviews_enabled: decode_json::<HashMap<String, bool>>(
			row.try_get::<&str, _>("subviews_enabled")?,
		)?,
		config: decode_json(row.try_get::<&str, _>("config")?)?,
		updated_at: Timestamp(row.try_get("updated_at")?),
	})
}

fn map_template(row: &SqliteRow) -> Result<RoleViewTemplate, sqlx::Error> {
	Ok(RoleViewTemplate {
		id: row.try_get("template_id")?,
		organization_id: row.try_get::<String, _>("org_id")?.into(),
		role: decode_enum(row.try_get::<&str, _>("role")?)?,
		module: decode_enum(row.try_get::<&str, _>("module")?)?,
		config: decode_json(row.try_get::<&str, _>("config")?)?,
		updated_at: Timestamp(row.try_get("updated_at")?),
	})
}

pub(crate) async fn read(
	db: &SqlitePool,
	org_id: Option<&str>,
	member_id: &str,
	module: Module,
) -> PbResult<Option<ModuleView>> {
	let mut query =
		sqlx::QueryBuilder::new(format!("SELECT {VIEW_COLUMNS} FROM module_views WHERE member_id = "));
	query.push_bind(member_id).push(" AND module = ").push_bind(module.as_str());
	if let Some(org_id) = org_id {
		query.push(" AND org_id = ").push_bind(org_id);
	}

	let row = query.build().fetch_optional(db).await.map_err(db_err)?;
	row.as_ref().map(map_view).transpose().map_err(db_err)
}

pub(crate) async fn upsert(
	db: &SqlitePool,
	org_id: &str,
	member_id: &str,
	module: Module,
	data: &UpdateModuleView,
) -> PbResult<ModuleView> {
	let layout = match &data.layout {
		Patch::Value(layout) => Some(&**layout),
		Patch::Null | Patch::Undefined => None,
	};
	let subviews = match &data.subviews_enabled {
		Some(subviews) => serde_json::to_string(subviews)?,
		None => "{}".into(),
	};
	let config = match &data.config {
		Some(config) => config.to_string(),
		None => "{}".into(),
	};

	// Only fields present in the update overwrite an existing row
	let mut sets = vec!["updated_at = unixepoch()"];
	if !data.layout.is_undefined() {
		sets.push("layout = excluded.layout");
	}
	if data.subviews_enabled.is_some() {
		sets.push("subviews_enabled = excluded.subviews_enabled");
	}
	if data.config.is_some() {
		sets.push("config = excluded.config");
	}

	let sql = format!(
		"INSERT INTO module_views (org_id, member_id, module, layout, subviews_enabled, config)
		VALUES (?, ?, ?, ?, ?, ?)
		ON CONFLICT(member_id, module) DO UPDATE SET {}
		RETURNING {VIEW_COLUMNS}",
		sets.join(", ")
	);
	let row = sqlx::query(&sql)
		.bind(org_id)
		.bind(member_id)
		.bind(module.as_str())
		.bind(layout)
		.bind(subviews)
		.bind(config)
		.fetch_one(db)
		.await
		.map_err(db_err)?;

	map_view(&row).map_err(db_err)
}

pub(crate) async fn apply_config(
	db: &SqlitePool,
	org_id: &str,
	member_ids: &[Box<str>],
	module: Module,
	config: &serde_json::Value,
) -> PbResult<usize> {
	let config = config.to_string();
	let mut tx = db.begin().await.map_err(db_err)?;
	for member_id in member_ids {
		sqlx::query(
			"INSERT INTO module_views (org_id, member_id, module, config) VALUES (?, ?, ?, ?)
			ON CONFLICT(member_id, module) DO UPDATE SET
				config = excluded.config,
				updated_at = unixepoch()",
		)
		.bind(org_id)
		.bind(&**member_id)
		.bind(module.as_str())
		.bind(&config)
		.execute(&mut *tx)
		.await
		.map_err(db_err)?;
	}
	tx.commit().await.map_err(db_err)?;

	Ok(member_ids.len())
}

pub(crate) async fn read_template(
	db: &SqlitePool,
	org_id: &str,
	role: Role,
	module: Module,
) -> PbResult<Option<RoleViewTemplate>> {
	let row = sqlx::query(&format!(
		"SELECT {TEMPLATE_COLUMNS} FROM role_view_templates
		WHERE org_id = ? AND role = ? AND module = ?"
	))
	.bind(org_id)
	.bind(role.as_str())
	.bind(module.as_str())
	.fetch_optional(db)
	.await
	.map_err(db_err)?;

	row.as_ref().map(map_template).transpose().map_err(db_err)
}

pub(crate) async fn upsert_template(
	db: &SqlitePool,
	org_id: &str,
	role: Role,
	module: Module,
	config: &serde_json::Value,
) -> PbResult<RoleViewTemplate> {
	let row = sqlx::query(&format!(
		"INSERT INTO role_view_templates (org_id, role, module, config) VALUES (?, ?, ?, ?)
		ON CONFLICT(org_id, role, module) DO UPDATE SET
			config = excluded.config,
			updated_at = unixepoch()
		RETURNING {TEMPLATE_COLUMNS}"
	))
	.bind(org_id)
	.bind(role.as_str())
	.bind(module.as_str())
	.bind(config.to_string())
	.fetch_one(db)
	.await
	.map_err(db_err)?;

	map_template(&row).map_err(db_err)
}

// vim: ts=4
