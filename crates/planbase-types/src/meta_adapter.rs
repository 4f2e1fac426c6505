//! Adapter that stores organization members, their permissions and view
//! configuration, and scoped configuration overrides.
//!
//! Every write that touches more than one row is expected to be atomic in the
//! implementation (one transaction).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::HashMap;
use std::fmt::Debug;

use crate::{
	config_types::ConfigScope,
	prelude::*,
	rbac::{Action, Module, PermissionScope, Role},
	types::serialize_timestamp_iso,
};

/// A user's membership in an organization
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationMember {
	pub id: Box<str>,
	pub organization_id: Box<str>,
	pub user_id: Box<str>,
	pub role: Role,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMember {
	pub organization_id: Box<str>,
	pub user_id: Box<str>,
	pub role: Role,
}

/// A single access-control fact
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
	pub id: i64,
	pub organization_id: Box<str>,
	pub member_id: Box<str>,
	pub module: Module,
	pub action: Action,
	pub allowed: bool,
	pub scope: PermissionScope,
	pub subview_key: Option<Box<str>>,
	pub version: i64,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub updated_at: Timestamp,
}

/// Permission value to be written for a member
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPermission {
	pub module: Module,
	pub action: Action,
	pub allowed: bool,
	#[serde(default)]
	pub subview_key: Option<Box<str>>,
}

impl NewPermission {
	pub fn new(module: Module, action: Action, allowed: bool) -> Self {
		Self { module, action, allowed, subview_key: None }
	}

	pub fn subview(module: Module, action: Action, subview_key: &str, allowed: bool) -> Self {
		Self { module, action, allowed, subview_key: Some(subview_key.into()) }
	}

	pub fn scope(&self) -> PermissionScope {
		if self.subview_key.is_some() { PermissionScope::Subview } else { PermissionScope::Module }
	}
}

/// Per-member UI visibility/layout configuration for a module
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleView {
	pub id: i64,
	pub organization_id: Box<str>,
	pub member_id: Box<str>,
	pub module: Module,
	pub layout: Option<Box<str>>,
	pub subviews_enabled: HashMap<String, bool>,
	pub config: serde_json::Value,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub updated_at: Timestamp,
}

/// Partial update of a module view. Undefined/`None` fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateModuleView {
	#[serde(default)]
	pub layout: Patch<Box<str>>,
	#[serde(default)]
	pub subviews_enabled: Option<HashMap<String, bool>>,
	#[serde(default)]
	pub config: Option<serde_json::Value>,
}

/// Organization-wide default view configuration for a role and module
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleViewTemplate {
	pub id: i64,
	pub organization_id: Box<str>,
	pub role: Role,
	pub module: Module,
	pub config: serde_json::Value,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub updated_at: Timestamp,
}

/// A scoped configuration override row
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
	pub id: i64,
	pub key: Box<str>,
	pub value: serde_json::Value,
	pub scope: ConfigScope,
	/// Always `None` for `ConfigScope::System`, always `Some` otherwise
	pub scope_id: Option<Box<str>>,
	pub version: i64,
	pub source: Box<str>,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub updated_at: Timestamp,
	pub updated_by: Option<Box<str>>,
}

#[async_trait]
pub trait MetaAdapter: Debug + Send + Sync {
	// Members
	//*********
	/// Reads a member, scoped to its organization
	async fn read_member(&self, org_id: &str, member_id: &str) -> PbResult<Option<OrganizationMember>>;
	async fn read_member_by_id(&self, member_id: &str) -> PbResult<Option<OrganizationMember>>;
	async fn read_member_by_user(
		&self,
		org_id: &str,
		user_id: &str,
	) -> PbResult<Option<OrganizationMember>>;
	async fn list_members(
		&self,
		org_id: &str,
		role: Option<Role>,
	) -> PbResult<Vec<OrganizationMember>>;
	/// Inserts the member together with its initial permission rows
	async fn create_member(
		&self,
		data: &CreateMember,
		perms: &[NewPermission],
	) -> PbResult<OrganizationMember>;
	/// Updates the role where both ids match and replaces the member's
	/// permissions with `perms`. `None` if no row matched.
	async fn update_member_role(
		&self,
		org_id: &str,
		member_id: &str,
		role: Role,
		perms: &[NewPermission],
	) -> PbResult<Option<OrganizationMember>>;
	/// Deletes a member together with its permissions and module views
	async fn delete_member(&self, org_id: &str, member_id: &str) -> PbResult<()>;

	// Permissions
	//*************
	async fn list_permissions(
		&self,
		org_id: &str,
		member_id: &str,
		module: Option<Module>,
	) -> PbResult<Vec<Permission>>;
	// Permission writes fail with `NotFound` unless the member belongs to `org_id`

	/// Plain bulk insert; fails on an existing row
	async fn insert_permissions(
		&self,
		org_id: &str,
		member_id: &str,
		perms: &[NewPermission],
	) -> PbResult<()>;
	/// Atomic insert-or-update on the natural key, bumping `version` on update
	async fn upsert_permission(
		&self,
		org_id: &str,
		member_id: &str,
		perm: &NewPermission,
	) -> PbResult<Permission>;
	/// Upserts every entry in one transaction
	async fn upsert_permissions(
		&self,
		org_id: &str,
		member_id: &str,
		perms: &[NewPermission],
	) -> PbResult<Vec<Permission>>;
	/// Deletes every permission of the member and inserts `perms`, in one transaction
	async fn replace_permissions(
		&self,
		org_id: &str,
		member_id: &str,
		perms: &[NewPermission],
	) -> PbResult<()>;

	// Module views
	//**************
	/// Reads a member's view of a module. Without `org_id` the lookup is by member only.
	async fn read_module_view(
		&self,
		org_id: Option<&str>,
		member_id: &str,
		module: Module,
	) -> PbResult<Option<ModuleView>>;
	async fn upsert_module_view(
		&self,
		org_id: &str,
		member_id: &str,
		module: Module,
		data: &UpdateModuleView,
	) -> PbResult<ModuleView>;
	/// Writes `config` into the module view of every listed member, in one transaction.
	/// Returns the number of views written.
	async fn apply_module_view_config(
		&self,
		org_id: &str,
		member_ids: &[Box<str>],
		module: Module,
		config: &serde_json::Value,
	) -> PbResult<usize>;

	// Role view templates
	//*********************
	async fn read_role_view_template(
		&self,
		org_id: &str,
		role: Role,
		module: Module,
	) -> PbResult<Option<RoleViewTemplate>>;
	async fn upsert_role_view_template(
		&self,
		org_id: &str,
		role: Role,
		module: Module,
		config: &serde_json::Value,
	) -> PbResult<RoleViewTemplate>;

	// Settings
	//**********
	/// SYSTEM scope always matches the row without scope id, whatever `scope_id` says
	async fn read_setting(
		&self,
		key: &str,
		scope: ConfigScope,
		scope_id: Option<&str>,
	) -> PbResult<Option<Setting>>;
	async fn list_settings(
		&self,
		scope: ConfigScope,
		scope_id: Option<&str>,
	) -> PbResult<Vec<Setting>>;
	/// Insert-or-update on (key, scope, scope_id), bumping `version` and marking the
	/// row customized
	async fn update_setting(
		&self,
		key: &str,
		scope: ConfigScope,
		scope_id: Option<&str>,
		value: &serde_json::Value,
		updated_by: Option<&str>,
	) -> PbResult<Setting>;
	async fn delete_setting(
		&self,
		key: &str,
		scope: ConfigScope,
		scope_id: Option<&str>,
	) -> PbResult<bool>;
}

// vim: ts=4
