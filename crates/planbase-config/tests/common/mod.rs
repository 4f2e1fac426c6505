//! Shared helpers for config resolver tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tempfile::TempDir;

use planbase_config::{ConfigCache, ConfigMap, ConfigResolver, RegistryCache, RegistrySource};
use planbase_meta_adapter_sqlite::MetaAdapterSqlite;
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

pub async fn create_test_adapter() -> (Arc<MetaAdapterSqlite>, TempDir) {
	setup_test_logging();
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = MetaAdapterSqlite::new(temp_dir.path().join("meta.db"))
		.await
		.expect("Failed to create adapter");
	(Arc::new(adapter), temp_dir)
}

pub fn create_resolver(
	meta: Arc<dyn MetaAdapter>,
	registry: Option<Arc<dyn RegistrySource>>,
) -> ConfigResolver {
	ConfigResolver::new(
		meta,
		registry,
		Arc::new(ConfigCache::default()),
		Arc::new(RegistryCache::default()),
	)
}

/// In-memory registry that can be switched into failure mode
#[derive(Debug, Default)]
pub struct MockRegistry {
	values: parking_lot::Mutex<ConfigMap>,
	failing: AtomicBool,
	fetches: AtomicUsize,
}

impl MockRegistry {
	pub fn with_values(values: serde_json::Value) -> Arc<Self> {
		let registry = Self::default();
		if let serde_json::Value::Object(map) = values {
			*registry.values.lock() = map;
		}
		Arc::new(registry)
	}

	pub fn failing() -> Arc<Self> {
		let registry = Self::default();
		registry.failing.store(true, Ordering::SeqCst);
		Arc::new(registry)
	}

	pub fn set_failing(&self, failing: bool) {
		self.failing.store(failing, Ordering::SeqCst);
	}

	pub fn fetches(&self) -> usize {
		self.fetches.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl RegistrySource for MockRegistry {
	async fn fetch(&self) -> PbResult<ConfigMap> {
		self.fetches.fetch_add(1, Ordering::SeqCst);
		if self.failing.load(Ordering::SeqCst) {
			return Err(Error::Timeout);
		}
		Ok(self.values.lock().clone())
	}
}

/// SQLite adapter whose settings listing fails for one scope
#[derive(Debug)]
pub struct FlakyAdapter {
	pub inner: Arc<MetaAdapterSqlite>,
	pub fail_scope: ConfigScope,
}

#[async_trait]
impl MetaAdapter for FlakyAdapter {
	async fn read_member(&self, org: &str, id: &str) -> PbResult<Option<OrganizationMember>> {
		self.inner.read_member(org, id).await
	}

	async fn read_member_by_id(&self, id: &str) -> PbResult<Option<OrganizationMember>> {
		self.inner.read_member_by_id(id).await
	}

	async fn read_member_by_user(
		&self,
		org: &str,
		user: &str,
	) -> PbResult<Option<OrganizationMember>> {
		self.inner.read_member_by_user(org, user).await
	}

	async fn list_members(
		&self,
		org: &str,
		role: Option<Role>,
	) -> PbResult<Vec<OrganizationMember>> {
		self.inner.list_members(org, role).await
	}

	async fn create_member(
		&self,
		data: &CreateMember,
		p: &[NewPermission],
	) -> PbResult<OrganizationMember> {
		self.inner.create_member(data, p).await
	}

	async fn update_member_role(
		&self,
		org: &str,
		id: &str,
		role: Role,
		p: &[NewPermission],
	) -> PbResult<Option<OrganizationMember>> {
		self.inner.update_member_role(org, id, role, p).await
	}

	async fn delete_member(&self, org: &str, id: &str) -> PbResult<()> {
		self.inner.delete_member(org, id).await
	}

	async fn list_permissions(
		&self,
		org: &str,
		id: &str,
		module: Option<Module>,
	) -> PbResult<Vec<Permission>> {
		self.inner.list_permissions(org, id, module).await
	}

	async fn insert_permissions(&self, org: &str, id: &str, p: &[NewPermission]) -> PbResult<()> {
		self.inner.insert_permissions(org, id, p).await
	}

	async fn upsert_permission(
		&self,
		org: &str,
		id: &str,
		p: &NewPermission,
	) -> PbResult<Permission> {
		self.inner.upsert_permission(org, id, p).await
	}

	async fn upsert_permissions(
		&self,
		org: &str,
		id: &str,
		p: &[NewPermission],
	) -> PbResult<Vec<Permission>> {
		self.inner.upsert_permissions(org, id, p).await
	}

	async fn replace_permissions(&self, org: &str, id: &str, p: &[NewPermission]) -> PbResult<()> {
		self.inner.replace_permissions(org, id, p).await
	}

	async fn read_module_view(
		&self,
		org: Option<&str>,
		id: &str,
		module: Module,
	) -> PbResult<Option<ModuleView>> {
		self.inner.read_module_view(org, id, module).await
	}

	async fn upsert_module_view(
		&self,
		org: &str,
		id: &str,
		module: Module,
		data: &UpdateModuleView,
	) -> PbResult<ModuleView> {
		self.inner.upsert_module_view(org, id, module, data).await
	}

	async fn apply_module_view_config(
		&self,
		org: &str,
		ids: &[Box<str>],
		module: Module,
		config: &serde_json::Value,
	) -> PbResult<usize> {
		self.inner.apply_module_view_config(org, ids, module, config).await
	}

	async fn read_role_view_template(
		&self,
		org: &str,
		role: Role,
		module: Module,
	) -> PbResult<Option<RoleViewTemplate>> {
		self.inner.read_role_view_template(org, role, module).await
	}

	async fn upsert_role_view_template(
		&self,
		org: &str,
		role: Role,
		module: Module,
		config: &serde_json::Value,
	) -> PbResult<RoleViewTemplate> {
		self.inner.upsert_role_view_template(org, role, module, config).await
	}

	async fn read_setting(
		&self,
		key: &str,
		scope: ConfigScope,
		scope_id: Option<&str>,
	) -> PbResult<Option<Setting>> {
		self.inner.read_setting(key, scope, scope_id).await
	}

	async fn list_settings(
		&self,
		scope: ConfigScope,
		scope_id: Option<&str>,
	) -> PbResult<Vec<Setting>> {
		if scope == self.fail_scope {
			return Err(Error::DbError);
		}
		self.inner.list_settings(scope, scope_id).await
	}

	async fn update_setting(
		&self,
		key: &str,
		scope: ConfigScope,
		scope_id: Option<&str>,
		value: &serde_json::Value,
		updated_by: Option<&str>,
	) -> PbResult<Setting> {
		self.inner.update_setting(key, scope, scope_id, value, updated_by).await
	}

	async fn delete_setting(
		&self,
		key: &str,
		scope: ConfigScope,
		scope_id: Option<&str>,
	) -> PbResult<bool> {
		self.inner.delete_setting(key, scope, scope_id).await
	}
}

// vim: ts=4
