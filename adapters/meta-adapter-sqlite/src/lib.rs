//! SQLite implementation of the Planbase `MetaAdapter`
//!
//! Domain modules hold the SQL; this file wires them into the adapter trait.

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::path::Path;

use planbase_types::config_types::ConfigScope;
use planbase_types::meta_adapter::{
	self, CreateMember, ModuleView, NewPermission, OrganizationMember, Permission,
	RoleViewTemplate, Setting, UpdateModuleView,
};
use planbase_types::prelude::*;
use planbase_types::rbac::{Module, Role};

mod member;
mod permission;
mod schema;
mod setting;
mod utils;
mod view;

#[derive(Debug)]
pub struct MetaAdapterSqlite {
	db: SqlitePool,
}

impl MetaAdapterSqlite {
	/// Opens (or creates) the database file and brings the schema up to date
	pub async fn new(path: impl AsRef<Path>) -> PbResult<Self> {
		if let Some(parent) = path.as_ref().parent() {
			if !parent.as_os_str().is_empty() {
				tokio::fs::create_dir_all(parent).await?;
			}
		}

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path.as_ref())
			.create_if_missing(true)
			.foreign_keys(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		schema::init_db(&db)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		info!("Meta adapter opened: {}", path.as_ref().display());
		Ok(Self { db })
	}
}

#[async_trait]
impl meta_adapter::MetaAdapter for MetaAdapterSqlite {
	// Members
	//*********
	async fn read_member(
		&self,
		org_id: &str,
		member_id: &str,
	) -> PbResult<Option<OrganizationMember>> {
		member::read(&self.db, org_id, member_id).await
	}

	async fn read_member_by_id(&self, member_id: &str) -> PbResult<Option<OrganizationMember>> {
		member::read_by_id(&self.db, member_id).await
	}

	async fn read_member_by_user(
		&self,
		org_id: &str,
		user_id: &str,
	) -> PbResult<Option<OrganizationMember>> {
		member::read_by_user(&self.db, org_id, user_id).await
	}

	async fn list_members(
		&self,
		org_id: &str,
		role: Option<Role>,
	) -> PbResult<Vec<OrganizationMember>> {
		member::list(&self.db, org_id, role).await
	}

	async fn create_member(
		&self,
		data: &CreateMember,
		perms: &[NewPermission],
	) -> PbResult<OrganizationMember> {
		member::create(&self.db, data, perms).await
	}

	async fn update_member_role(
		&self,
		org_id: &str,
		member_id: &str,
		role: Role,
		perms: &[NewPermission],
	) -> PbResult<Option<OrganizationMember>> {
		member::update_role(&self.db, org_id, member_id, role, perms).await
	}

	async fn delete_member(&self, org_id: &str, member_id: &str) -> PbResult<()> {
		member::delete(&self.db, org_id, member_id).await
	}

	// Permissions
	//*************
	async fn list_permissions(
		&self,
		org_id: &str,
		member_id: &str,
		module: Option<Module>,
	) -> PbResult<Vec<Permission>> {
		permission::list(&self.db, org_id, member_id, module).await
	}

	async fn insert_permissions(
		&self,
		org_id: &str,
		member_id: &str,
		perms: &[NewPermission],
	) -> PbResult<()> {
		permission::insert_many(&self.db, org_id, member_id, perms).await
	}

	async fn upsert_permission(
		&self,
		org_id: &str,
		member_id: &str,
		perm: &NewPermission,
	) -> PbResult<Permission> {
		permission::upsert(&self.db, org_id, member_id, perm).await
	}

	async fn upsert_permissions(
		&self,
		org_id: &str,
		member_id: &str,
		perms: &[NewPermission],
	) -> PbResult<Vec<Permission>> {
		permission::upsert_many(&self.db, org_id, member_id, perms).await
	}

	async fn replace_permissions(
		&self,
		org_id: &str,
		member_id: &str,
		perms: &[NewPermission],
	) -> PbResult<()> {
		permission::replace(&self.db, org_id, member_id, perms).await
	}

	// Module views
	//**************
	async fn read_module_view(
		&self,
		org_id: Option<&str>,
		member_id: &str,
		module: Module,
	) -> PbResult<Option<ModuleView>> {
		view::read(&self.db, org_id, member_id, module).await
	}

	async fn upsert_module_view(
		&self,
		org_id: &str,
		member_id: &str,
		module: Module,
		data: &UpdateModuleView,
	) -> PbResult<ModuleView> {
		view::upsert(&self.db, org_id, member_id, module, data).await
	}

	async fn apply_module_view_config(
		&self,
		org_id: &str,
		member_ids: &[Box<str>],
		module: Module,
		config: &serde_json::Value,
	) -> PbResult<usize> {
		view::apply_config(&self.db, org_id, member_ids, module, config).await
	}

	// Role view templates
	//*********************
	async fn read_role_view_template(
		&self,
		org_id: &str,
		role: Role,
		module: Module,
	) -> PbResult<Option<RoleViewTemplate>> {
		view::read_template(&self.db, org_id, role, module).await
	}

	async fn upsert_role_view_template(
		&self,
		org_id: &str,
		role: Role,
		module: Module,
		config: &serde_json::Value,
	) -> PbResult<RoleViewTemplate> {
		view::upsert_template(&self.db, org_id, role, module, config).await
	}

	// Settings
	//**********
	async fn read_setting(
		&self,
		key: &str,
		scope: ConfigScope,
		scope_id: Option<&str>,
	) -> PbResult<Option<Setting>> {
		setting::read(&self.db, key, scope, scope_id).await
	}

	async fn list_settings(
		&self,
		scope: ConfigScope,
		scope_id: Option<&str>,
	) -> PbResult<Vec<Setting>> {
		setting::list(&self.db, scope, scope_id).await
	}

	async fn update_setting(
		&self,
		key: &str,
		scope: ConfigScope,
		scope_id: Option<&str>,
		value: &serde_json::Value,
		updated_by: Option<&str>,
	) -> PbResult<Setting> {
		setting::update(&self.db, key, scope, scope_id, value, updated_by).await
	}

	async fn delete_setting(
		&self,
		key: &str,
		scope: ConfigScope,
		scope_id: Option<&str>,
	) -> PbResult<bool> {
		setting::delete(&self.db, key, scope, scope_id).await
	}
}

// vim: ts=4
