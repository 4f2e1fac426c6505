//! Module views and role view templates
//!
//! Templates are applied by copying their config into each current member's
//! module view. Members added later are not affected until the next apply.

use planbase_types::meta_adapter::{ModuleView, RoleViewTemplate, UpdateModuleView};

use crate::prelude::*;
use crate::resolver::PermissionResolver;

impl PermissionResolver {
	// Module views
	//**************
	pub async fn get_module_view(
		&self,
		member_id: &str,
		module: Module,
	) -> PbResult<Option<ModuleView>> {
		self.meta.read_module_view(None, member_id, module).await
	}

	/// Writes a member's module view in the member's own organization.
	/// Returns `None` for an unknown member.
	pub async fn set_module_view(
		&self,
		member_id: &str,
		module: Module,
		data: &UpdateModuleView,
	) -> PbResult<Option<ModuleView>> {
		let Some(member) = self.meta.read_member_by_id(member_id).await? else {
			return Ok(None);
		};
		let view =
			self.meta.upsert_module_view(&member.organization_id, member_id, module, data).await?;
		Ok(Some(view))
	}

	pub async fn get_module_view_with_org(
		&self,
		member_id: &str,
		org_id: &str,
		module: Module,
	) -> PbResult<Option<ModuleView>> {
		self.meta.read_module_view(Some(org_id), member_id, module).await
	}

	/// Tenant-scoped write: `None` if the member is not part of `org_id`
	pub async fn set_module_view_with_org(
		&self,
		member_id: &str,
		org_id: &str,
		module: Module,
		data: &UpdateModuleView,
	) -> PbResult<Option<ModuleView>> {
		if self.meta.read_member(org_id, member_id).await?.is_none() {
			debug!(org_id, member_id, "Module view write matched no member");
			return Ok(None);
		}
		let view = self.meta.upsert_module_view(org_id, member_id, module, data).await?;
		Ok(Some(view))
	}

	// Role view templates
	//*********************
	pub async fn get_role_view_template(
		&self,
		org_id: &str,
		role: Role,
		module: Module,
	) -> PbResult<Option<RoleViewTemplate>> {
		self.meta.read_role_view_template(org_id, role, module).await
	}

	pub async fn set_role_view_template(
		&self,
		org_id: &str,
		role: Role,
		module: Module,
		config: &serde_json::Value,
	) -> PbResult<RoleViewTemplate> {
		let template = self.meta.upsert_role_view_template(org_id, role, module, config).await?;
		info!(org_id, "View template for {}/{} updated", role, module);
		Ok(template)
	}

	/// Writes `config` into the module view of every current member with
	/// `role`, in one transaction. Returns the number of members updated.
	pub async fn apply_role_view_template_to_all(
		&self,
		org_id: &str,
		role: Role,
		module: Module,
		config: &serde_json::Value,
	) -> PbResult<usize> {
		let member_ids: Vec<Box<str>> = self
			.meta
			.list_members(org_id, Some(role))
			.await?
			.into_iter()
			.map(|m| m.id)
			.collect();
		if member_ids.is_empty() {
			return Ok(0);
		}

		let count = self.meta.apply_module_view_config(org_id, &member_ids, module, config).await?;
		info!(org_id, "View template {}/{} applied to {} members", role, module, count);
		Ok(count)
	}

	pub async fn get_guest_view_template(
		&self,
		org_id: &str,
		module: Module,
	) -> PbResult<Option<RoleViewTemplate>> {
		self.get_role_view_template(org_id, Role::Guest, module).await
	}

	pub async fn set_guest_view_template(
		&self,
		org_id: &str,
		module: Module,
		config: &serde_json::Value,
	) -> PbResult<RoleViewTemplate> {
		self.set_role_view_template(org_id, Role::Guest, module, config).await
	}

	pub async fn apply_guest_view_template_to_all(
		&self,
		org_id: &str,
		module: Module,
		config: &serde_json::Value,
	) -> PbResult<usize> {
		self.apply_role_view_template_to_all(org_id, Role::Guest, module, config).await
	}

	pub async fn get_member_view_template(
		&self,
		org_id: &str,
		module: Module,
	) -> PbResult<Option<RoleViewTemplate>> {
		self.get_role_view_template(org_id, Role::Member, module).await
	}

	pub async fn set_member_view_template(
		&self,
		org_id: &str,
		module: Module,
		config: &serde_json::Value,
	) -> PbResult<RoleViewTemplate> {
		self.set_role_view_template(org_id, Role::Member, module, config).await
	}

	pub async fn apply_member_view_template_to_all(
		&self,
		org_id: &str,
		module: Module,
		config: &serde_json::Value,
	) -> PbResult<usize> {
		self.apply_role_view_template_to_all(org_id, Role::Member, module, config).await
	}
}

// vim: ts=4
