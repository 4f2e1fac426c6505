//! Organization membership rows
//!
//! Every mutation is guarded by both the member id and the organization id.

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use planbase_types::meta_adapter::{CreateMember, NewPermission, OrganizationMember};
use planbase_types::prelude::*;
use planbase_types::rbac::Role;

use crate::permission;
use crate::utils::{collect_res, db_err, decode_enum};

const MEMBER_COLUMNS: &str = "member_id, org_id, user_id, role, created_at";

fn map_member(row: &SqliteRow) -> Result<OrganizationMember, sqlx::Error> {
	Ok(OrganizationMember {
		id: row.try_get::<String, _>("member_id")?.into(),
		organization_id: row.try_get::<String, _>("org_id")?.into(),
		user_id: row.try_get::<String, _>("user_id")?.into(),
		role: decode_enum(row.try_get::<&str, _>("role")?)?,
		created_at: Timestamp(row.try_get("created_at")?),
	})
}

fn map_opt(row: Option<SqliteRow>) -> PbResult<Option<OrganizationMember>> {
	row.as_ref().map(map_member).transpose().map_err(db_err)
}

pub(crate) async fn read(
	db: &SqlitePool,
	org_id: &str,
	member_id: &str,
) -> PbResult<Option<OrganizationMember>> {
	let row = sqlx::query(&format!(
		"SELECT {MEMBER_COLUMNS} FROM organization_members WHERE member_id = ? AND org_id = ?"
	))
	.bind(member_id)
	.bind(org_id)
	.fetch_optional(db)
	.await
	.map_err(db_err)?;

	map_opt(row)
}

pub(crate) async fn read_by_id(
	db: &SqlitePool,
	member_id: &str,
) -> PbResult<Option<OrganizationMember>> {
	let row =
		sqlx::query(&format!("SELECT {MEMBER_COLUMNS} FROM organization_members WHERE member_id = ?"))
			.bind(member_id)
			.fetch_optional(db)
			.await
			.map_err(db_err)?;

	map_opt(row)
}

pub(crate) async fn read_by_user(
	db: &SqlitePool,
	org_id: &str,
	user_id: &str,
) -> PbResult<Option<OrganizationMember>> {
	let row = sqlx::query(&format!(
		"SELECT {MEMBER_COLUMNS} FROM organization_members WHERE org_id = ? AND user_id = ?"
	))
	.bind(org_id)
	.bind(user_id)
	.fetch_optional(db)
	.await
	.map_err(db_err)?;

	map_opt(row)
}

pub(crate) async fn list(
	db: &SqlitePool,
	org_id: &str,
	role: Option<Role>,
) -> PbResult<Vec<OrganizationMember>> {
	let mut query = sqlx::QueryBuilder::new(format!(
		"SELECT {MEMBER_COLUMNS} FROM organization_members WHERE org_id = "
	));
	query.push_bind(org_id);
	if let Some(role) = role {
		query.push(" AND role = ").push_bind(role.as_str());
	}
	query.push(" ORDER BY created_at, member_id");

	let rows = query.build().fetch_all(db).await.map_err(db_err)?;
	collect_res(rows.iter().map(map_member))
}

/// Inserts the member and its permission rows in one transaction
pub(crate) async fn create(
	db: &SqlitePool,
	data: &CreateMember,
	perms: &[NewPermission],
) -> PbResult<OrganizationMember> {
	let member_id = uuid::Uuid::new_v4().to_string();
	let mut tx = db.begin().await.map_err(db_err)?;

	let row = sqlx::query(&format!(
		"INSERT INTO organization_members (member_id, org_id, user_id, role)
		VALUES (?, ?, ?, ?) RETURNING {MEMBER_COLUMNS}"
	))
	.bind(&member_id)
	.bind(&*data.organization_id)
	.bind(&*data.user_id)
	.bind(data.role.as_str())
	.fetch_one(&mut *tx)
	.await
	.map_err(db_err)?;
	let member = map_member(&row).map_err(db_err)?;

	for perm in perms {
		permission::insert_one(&mut tx, &member.organization_id, &member.id, perm)
			.await
			.map_err(db_err)?;
	}

	tx.commit().await.map_err(db_err)?;
	Ok(member)
}

/// Changes the role where both ids match and replaces the member's permission
/// rows with `perms`, in one transaction
pub(crate) async fn update_role(
	db: &SqlitePool,
	org_id: &str,
	member_id: &str,
	role: Role,
	perms: &[NewPermission],
) -> PbResult<Option<OrganizationMember>> {
	let mut tx = db.begin().await.map_err(db_err)?;

	let row = sqlx::query(&format!(
		"UPDATE organization_members SET role = ? WHERE member_id = ? AND org_id = ?
		RETURNING {MEMBER_COLUMNS}"
	))
	.bind(role.as_str())
	.bind(member_id)
	.bind(org_id)
	.fetch_optional(&mut *tx)
	.await
	.map_err(db_err)?;
	let Some(member) = map_opt(row)? else {
		return Ok(None);
	};

	permission::replace_in(&mut tx, org_id, member_id, perms).await.map_err(db_err)?;

	tx.commit().await.map_err(db_err)?;
	Ok(Some(member))
}

/// Deletes the member and everything hanging off it
pub(crate) async fn delete(db: &SqlitePool, org_id: &str, member_id: &str) -> PbResult<()> {
	let mut tx = db.begin().await.map_err(db_err)?;

	sqlx::query("DELETE FROM permissions WHERE member_id = ? AND org_id = ?")
		.bind(member_id)
		.bind(org_id)
		.execute(&mut *tx)
		.await
		.map_err(db_err)?;
	sqlx::query("DELETE FROM module_views WHERE member_id = ? AND org_id = ?")
		.bind(member_id)
		.bind(org_id)
		.execute(&mut *tx)
		.await
		.map_err(db_err)?;
	let res = sqlx::query("DELETE FROM organization_members WHERE member_id = ? AND org_id = ?")
		.bind(member_id)
		.bind(org_id)
		.execute(&mut *tx)
		.await
		.map_err(db_err)?;

	tx.commit().await.map_err(db_err)?;
	debug!(org_id, member_id, deleted = res.rows_affected(), "Member delete");

	Ok(())
}

// vim: ts=4
