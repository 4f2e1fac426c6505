//! Shared helpers for permission resolver tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use tempfile::TempDir;

use planbase_meta_adapter_sqlite::MetaAdapterSqlite;
use planbase_perm::{PermissionCache, PermissionResolver};
use planbase_types::config_types::ConfigScope;
use planbase_types::error::{Error, PbResult};
use planbase_types::meta_adapter::{
	CreateMember, MetaAdapter, ModuleView, NewPermission, OrganizationMember, Permission,
	RoleViewTemplate, Setting, UpdateModuleView,
};
use planbase_types::rbac::{Module, Role};

pub fn setup_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::DEBUG)
		.try_init();
}

/// Resolver over a fresh SQLite database. Keep the TempDir alive for the
/// duration of the test.
pub async fn create_test_resolver() -> (PermissionResolver, TempDir) {
	setup_test_logging();
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = MetaAdapterSqlite::new(temp_dir.path().join("meta.db"))
		.await
		.expect("Failed to create adapter");

	let resolver = PermissionResolver::new(Arc::new(adapter), Arc::new(PermissionCache::default()));
	(resolver, temp_dir)
}

pub fn new_member(org: &str, user: &str, role: Role) -> CreateMember {
	CreateMember { organization_id: org.into(), user_id: user.into(), role }
}

/// Adapter whose every operation fails like an unreachable database
#[derive(Debug)]
pub struct FailingAdapter;

#[async_trait]
impl MetaAdapter for FailingAdapter {
	async fn read_member(&self, _: &str, _: &str) -> PbResult<Option<OrganizationMember>> {
		Err(Error::DbError)
	}

	async fn read_member_by_id(&self, _: &str) -> PbResult<Option<OrganizationMember>> {
		Err(Error::DbError)
	}

	async fn read_member_by_user(&self, _: &str, _: &str) -> PbResult<Option<OrganizationMember>> {
		Err(Error::DbError)
	}

	async fn list_members(&self, _: &str, _: Option<Role>) -> PbResult<Vec<OrganizationMember>> {
		Err(Error::DbError)
	}

	async fn create_member(
		&self,
		_: &CreateMember,
		_: &[NewPermission],
	) -> PbResult<OrganizationMember> {
		Err(Error::DbError)
	}

	async fn update_member_role(
		&self,
		_: &str,
		_: &str,
		_: Role,
		_: &[NewPermission],
	) -> PbResult<Option<OrganizationMember>> {
		Err(Error::DbError)
	}

	async fn delete_member(&self, _: &str, _: &str) -> PbResult<()> {
		Err(Error::DbError)
	}

	async fn list_permissions(
		&self,
		_: &str,
		_: &str,
		_: Option<Module>,
	) -> PbResult<Vec<Permission>> {
		Err(Error::DbError)
	}

	async fn insert_permissions(&self, _: &str, _: &str, _: &[NewPermission]) -> PbResult<()> {
		Err(Error::DbError)
	}

	async fn upsert_permission(&self, _: &str, _: &str, _: &NewPermission) -> PbResult<Permission> {
		Err(Error::DbError)
	}

	async fn upsert_permissions(
		&self,
		_: &str,
		_: &str,
		_: &[NewPermission],
	) -> PbResult<Vec<Permission>> {
		Err(Error::DbError)
	}

	async fn replace_permissions(&self, _: &str, _: &str, _: &[NewPermission]) -> PbResult<()> {
		Err(Error::DbError)
	}

	async fn read_module_view(
		&self,
		_: Option<&str>,
		_: &str,
		_: Module,
	) -> PbResult<Option<ModuleView>> {
		Err(Error::DbError)
	}

	async fn upsert_module_view(
		&self,
		_: &str,
		_: &str,
		_: Module,
		_: &UpdateModuleView,
	) -> PbResult<ModuleView> {
		Err(Error::DbError)
	}

	async fn apply_module_view_config(
		&self,
		_: &str,
		_: &[Box<str>],
		_: Module,
		_: &serde_json::Value,
	) -> PbResult<usize> {
		Err(Error::DbError)
	}

	async fn read_role_view_template(
		&self,
		_: &str,
		_: Role,
		_: Module,
	) -> PbResult<Option<RoleViewTemplate>> {
		Err(Error::DbError)
	}

	async fn upsert_role_view_template(
		&self,
		_: &str,
		_: Role,
		_: Module,
		_: &serde_json::Value,
	) -> PbResult<RoleViewTemplate> {
		Err(Error::DbError)
	}

	async fn read_setting(
		&self,
		_: &str,
		_: ConfigScope,
		_: Option<&str>,
	) -> PbResult<Option<Setting>> {
		Err(Error::DbError)
	}

	async fn list_settings(&self, _: ConfigScope, _: Option<&str>) -> PbResult<Vec<Setting>> {
		Err(Error::DbError)
	}

	async fn update_setting(
		&self,
		_: &str,
		_: ConfigScope,
		_: Option<&str>,
		_: &serde_json::Value,
		_: Option<&str>,
	) -> PbResult<Setting> {
		Err(Error::DbError)
	}

	async fn delete_setting(&self, _: &str, _: ConfigScope, _: Option<&str>) -> PbResult<bool> {
		Err(Error::DbError)
	}
}

// vim: ts=4
