//! Database schema initialization
//!
//! Creates tables and indexes idempotently. The UNIQUE constraints carry the
//! one-row-per-natural-key invariants; upserts in the domain modules target
//! them with `ON CONFLICT`.

use sqlx::SqlitePool;

/// Initialize the database schema with all required tables and indexes
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Members
	//*********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS organization_members (
		member_id text NOT NULL,
		org_id text NOT NULL,
		user_id text NOT NULL,
		role text NOT NULL,
		created_at integer NOT NULL DEFAULT (unixepoch()),
		PRIMARY KEY(member_id),
		UNIQUE(org_id, user_id)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_organization_members_org_role
		ON organization_members(org_id, role)",
	)
	.execute(&mut *tx)
	.await?;

	// Permissions
	//*************
	// subview_key is '' for module-scoped rows so the UNIQUE constraint applies
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS permissions (
		perm_id integer PRIMARY KEY AUTOINCREMENT,
		org_id text NOT NULL,
		member_id text NOT NULL,
		module text NOT NULL,
		action text NOT NULL,
		scope text NOT NULL DEFAULT 'module',
		subview_key text NOT NULL DEFAULT '',
		allowed boolean NOT NULL,
		version integer NOT NULL DEFAULT 1,
		updated_at integer NOT NULL DEFAULT (unixepoch()),
		UNIQUE(member_id, module, action, scope, subview_key)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_permissions_org_member ON permissions(org_id, member_id)",
	)
	.execute(&mut *tx)
	.await?;

	// Views
	//*******
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS module_views (
		view_id integer PRIMARY KEY AUTOINCREMENT,
		org_id text NOT NULL,
		member_id text NOT NULL,
		module text NOT NULL,
		layout text,
		subviews_enabled json NOT NULL DEFAULT '{}',
		config json NOT NULL DEFAULT '{}',
		updated_at integer NOT NULL DEFAULT (unixepoch()),
		UNIQUE(member_id, module)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS role_view_templates (
		template_id integer PRIMARY KEY AUTOINCREMENT,
		org_id text NOT NULL,
		role text NOT NULL,
		module text NOT NULL,
		config json NOT NULL DEFAULT '{}',
		updated_at integer NOT NULL DEFAULT (unixepoch()),
		UNIQUE(org_id, role, module)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Settings
	//**********
	// scope_id is '' for SYSTEM rows
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS settings (
		setting_id integer PRIMARY KEY AUTOINCREMENT,
		name text NOT NULL,
		value json NOT NULL,
		scope text NOT NULL,
		scope_id text NOT NULL DEFAULT '',
		version integer NOT NULL DEFAULT 1,
		source text NOT NULL DEFAULT 'customized',
		updated_at integer NOT NULL DEFAULT (unixepoch()),
		updated_by text,
		UNIQUE(name, scope, scope_id)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_settings_scope ON settings(scope, scope_id)")
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;

	Ok(())
}

// vim: ts=4
