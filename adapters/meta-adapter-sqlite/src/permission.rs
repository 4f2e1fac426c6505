//! Permission rows
//!
//! Upserts are single `INSERT ... ON CONFLICT DO UPDATE` statements keyed on
//! (member_id, module, action, scope, subview_key), so concurrent writers can
//! never produce duplicate rows. Every write first checks, inside its
//! transaction, that the member belongs to the organization.

use sqlx::{Row, SqliteConnection, SqlitePool, sqlite::SqliteRow};

use planbase_types::meta_adapter::{NewPermission, Permission};
use planbase_types::prelude::*;
use planbase_types::rbac::Module;

use crate::utils::{collect_res, db_err, decode_enum, none_if_empty};

const PERM_COLUMNS: &str =
	"perm_id, org_id, member_id, module, action, scope, subview_key, allowed, version, updated_at";

fn map_permission(row: &SqliteRow) -> Result<Permission, sqlx::Error> {
	Ok(Permission {
		id: row.try_get("perm_id")?,
		organization_id: row.try_get::<String, _>("org_id")?.into(),
		member_id: row.try_get::<String, _>("member_id")?.into(),
		module: decode_enum(row.try_get::<&str, _>("module")?)?,
		action: decode_enum(row.try_get::<&str, _>("action")?)?,
		allowed: row.try_get("allowed")?,
		scope: decode_enum(row.try_get::<&str, _>("scope")?)?,
		subview_key: none_if_empty(row.try_get("subview_key")?),
		version: row.try_get("version")?,
		updated_at: Timestamp(row.try_get("updated_at")?),
	})
}

pub(crate) async fn list(
	db: &SqlitePool,
	org_id: &str,
	member_id: &str,
	module: Option<Module>,
) -> PbResult<Vec<Permission>> {
	let mut query = sqlx::QueryBuilder::new(format!(
		"SELECT {PERM_COLUMNS} FROM permissions WHERE org_id = "
	));
	query.push_bind(org_id).push(" AND member_id = ").push_bind(member_id);
	if let Some(module) = module {
		query.push(" AND module = ").push_bind(module.as_str());
	}
	query.push(" ORDER BY perm_id");

	let rows = query.build().fetch_all(db).await.map_err(db_err)?;
	collect_res(rows.iter().map(map_permission))
}

/// `NotFound` unless `member_id` is a member of `org_id`
async fn ensure_member(
	conn: &mut SqliteConnection,
	org_id: &str,
	member_id: &str,
) -> PbResult<()> {
	let found = sqlx::query("SELECT 1 FROM organization_members WHERE member_id = ? AND org_id = ?")
		.bind(member_id)
		.bind(org_id)
		.fetch_optional(&mut *conn)
		.await
		.map_err(db_err)?;

	if found.is_none() {
		debug!(org_id, member_id, "Permission write for unknown member");
		return Err(Error::NotFound);
	}
	Ok(())
}

pub(crate) async fn insert_one(
	conn: &mut SqliteConnection,
	org_id: &str,
	member_id: &str,
	perm: &NewPermission,
) -> Result<(), sqlx::Error> {
	sqlx::query(
		"INSERT INTO permissions (org_id, member_id, module, action, scope, subview_key, allowed)
		VALUES (?, ?, ?, ?, ?, ?, ?)",
	)
	.bind(org_id)
	.bind(member_id)
	.bind(perm.module.as_str())
	.bind(perm.action.as_str())
	.bind(perm.scope().as_str())
	.bind(perm.subview_key.as_deref().unwrap_or(""))
	.bind(perm.allowed)
	.execute(&mut *conn)
	.await?;
	Ok(())
}

async fn upsert_one(
	conn: &mut SqliteConnection,
	org_id: &str,
	member_id: &str,
	perm: &NewPermission,
) -> Result<Permission, sqlx::Error> {
	let row = sqlx::query(&format!(
		"INSERT INTO permissions (org_id, member_id, module, action, scope, subview_key, allowed)
		VALUES (?, ?, ?, ?, ?, ?, ?)
		ON CONFLICT(member_id, module, action, scope, subview_key) DO UPDATE SET
			allowed = excluded.allowed,
			version = permissions.version + 1,
			updated_at = unixepoch()
		RETURNING {PERM_COLUMNS}"
	))
	.bind(org_id)
	.bind(member_id)
	.bind(perm.module.as_str())
	.bind(perm.action.as_str())
	.bind(perm.scope().as_str())
	.bind(perm.subview_key.as_deref().unwrap_or(""))
	.bind(perm.allowed)
	.fetch_one(&mut *conn)
	.await?;

	map_permission(&row)
}

pub(crate) async fn insert_many(
	db: &SqlitePool,
	org_id: &str,
	member_id: &str,
	perms: &[NewPermission],
) -> PbResult<()> {
	let mut tx = db.begin().await.map_err(db_err)?;
	ensure_member(&mut tx, org_id, member_id).await?;
	for perm in perms {
		insert_one(&mut tx, org_id, member_id, perm).await.map_err(db_err)?;
	}
	tx.commit().await.map_err(db_err)
}

pub(crate) async fn upsert(
	db: &SqlitePool,
	org_id: &str,
	member_id: &str,
	perm: &NewPermission,
) -> PbResult<Permission> {
	let mut tx = db.begin().await.map_err(db_err)?;
	ensure_member(&mut tx, org_id, member_id).await?;
	let res = upsert_one(&mut tx, org_id, member_id, perm).await.map_err(db_err)?;
	tx.commit().await.map_err(db_err)?;
	Ok(res)
}

pub(crate) async fn upsert_many(
	db: &SqlitePool,
	org_id: &str,
	member_id: &str,
	perms: &[NewPermission],
) -> PbResult<Vec<Permission>> {
	let mut tx = db.begin().await.map_err(db_err)?;
	ensure_member(&mut tx, org_id, member_id).await?;
	let mut res = Vec::with_capacity(perms.len());
	for perm in perms {
		res.push(upsert_one(&mut tx, org_id, member_id, perm).await.map_err(db_err)?);
	}
	tx.commit().await.map_err(db_err)?;
	Ok(res)
}

pub(crate) async fn replace(
	db: &SqlitePool,
	org_id: &str,
	member_id: &str,
	perms: &[NewPermission],
) -> PbResult<()> {
	let mut tx = db.begin().await.map_err(db_err)?;
	ensure_member(&mut tx, org_id, member_id).await?;
	replace_in(&mut tx, org_id, member_id, perms).await.map_err(db_err)?;
	tx.commit().await.map_err(db_err)
}

/// Delete-then-insert on an open transaction
pub(crate) async fn replace_in(
	conn: &mut SqliteConnection,
	org_id: &str,
	member_id: &str,
	perms: &[NewPermission],
) -> Result<(), sqlx::Error> {
	sqlx::query("DELETE FROM permissions WHERE org_id = ? AND member_id = ?")
		.bind(org_id)
		.bind(member_id)
		.execute(&mut *conn)
		.await?;
	for perm in perms {
		insert_one(&mut *conn, org_id, member_id, perm).await?;
	}
	Ok(())
}

// vim: ts=4
