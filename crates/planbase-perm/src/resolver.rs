//! Permission resolution and permission row management
//!
//! Persistence errors propagate to the caller. Denial is the default: a missing
//! row means "not allowed", and `check_permission` also answers `false` when
//! the lookup itself fails.

use std::collections::BTreeMap;
use std::sync::Arc;

use planbase_types::meta_adapter::{CreateMember, MetaAdapter, NewPermission, OrganizationMember, Permission};
use planbase_types::rbac::PermissionScope;

use crate::cache::PermissionCache;
use crate::defaults::default_permissions;
use crate::prelude::*;

/// Dense module-level matrix: every module and action present
pub type PermissionMatrix = BTreeMap<Module, BTreeMap<Action, bool>>;

#[derive(Debug, Clone)]
pub struct PermissionResolver {
	pub(crate) meta: Arc<dyn MetaAdapter>,
	cache: Arc<PermissionCache>,
}

impl PermissionResolver {
	pub fn new(meta: Arc<dyn MetaAdapter>, cache: Arc<PermissionCache>) -> Self {
		Self { meta, cache }
	}

	pub fn cache(&self) -> &PermissionCache {
		&self.cache
	}

	// Members
	//*********
	pub async fn get_member_by_user_and_org(
		&self,
		user_id: &str,
		org_id: &str,
	) -> PbResult<Option<OrganizationMember>> {
		self.meta.read_member_by_user(org_id, user_id).await
	}

	pub async fn get_member(
		&self,
		member_id: &str,
		org_id: &str,
	) -> PbResult<Option<OrganizationMember>> {
		self.meta.read_member(org_id, member_id).await
	}

	pub async fn list_members(
		&self,
		org_id: &str,
		role: Option<Role>,
	) -> PbResult<Vec<OrganizationMember>> {
		self.meta.list_members(org_id, role).await
	}

	/// Creates the member and its full default permission matrix atomically
	pub async fn create_member(&self, data: &CreateMember) -> PbResult<OrganizationMember> {
		let member = self.meta.create_member(data, &default_permissions(data.role)).await?;

		info!(
			org_id = %member.organization_id,
			member_id = %member.id,
			"Member created with role {}",
			member.role
		);
		Ok(member)
	}

	/// Changes a member's role and resets its permissions to the new role's
	/// defaults, atomically. Returns `None` if the member does not exist in `org_id`.
	pub async fn update_member_role(
		&self,
		member_id: &str,
		role: Role,
		org_id: &str,
	) -> PbResult<Option<OrganizationMember>> {
		let perms = default_permissions(role);
		let Some(member) = self.meta.update_member_role(org_id, member_id, role, &perms).await?
		else {
			debug!(org_id, member_id, "Role update matched no member");
			return Ok(None);
		};

		self.cache.invalidate_member(org_id, member_id);
		info!(org_id, member_id, "Member role changed to {}", role);
		Ok(Some(member))
	}

	/// Removes a member together with its permissions and module views.
	///
	/// Always answers `true`, also when nothing matched.
	pub async fn delete_member(&self, member_id: &str, org_id: &str) -> PbResult<bool> {
		self.meta.delete_member(org_id, member_id).await?;
		self.cache.invalidate_member(org_id, member_id);
		info!(org_id, member_id, "Member deleted");
		Ok(true)
	}

	// Permissions
	//*************
	pub async fn get_permissions_for_member(
		&self,
		member_id: &str,
		org_id: &str,
		module: Option<Module>,
	) -> PbResult<Arc<[Permission]>> {
		if let Some(perms) = self.cache.get(org_id, member_id, module) {
			debug!("Permission cache hit: {}/{}", org_id, member_id);
			return Ok(perms);
		}

		debug!("Permission cache miss: {}/{}", org_id, member_id);
		let perms: Arc<[Permission]> =
			self.meta.list_permissions(org_id, member_id, module).await?.into();
		self.cache.put(org_id, member_id, module, perms.clone());
		Ok(perms)
	}

	/// A subview permission, when asked for and present, wins over the
	/// module-level one. No matching row means denied.
	pub async fn has_permission(
		&self,
		member_id: &str,
		org_id: &str,
		module: Module,
		action: Action,
		subview_key: Option<&str>,
	) -> PbResult<bool> {
		let perms = self.get_permissions_for_member(member_id, org_id, Some(module)).await?;
		let matching = |scope: PermissionScope, key: Option<&str>| {
			perms.iter().find(|p| {
				p.module == module
					&& p.action == action
					&& p.scope == scope
					&& p.subview_key.as_deref() == key
			})
		};

		let subview = subview_key.and_then(|key| matching(PermissionScope::Subview, Some(key)));
		let found = subview.or_else(|| matching(PermissionScope::Module, None));
		Ok(found.is_some_and(|p| p.allowed))
	}

	/// Like `has_permission`, but any lookup failure denies
	pub async fn check_permission(
		&self,
		member_id: &str,
		org_id: &str,
		module: Module,
		action: Action,
		subview_key: Option<&str>,
	) -> bool {
		match self.has_permission(member_id, org_id, module, action, subview_key).await {
			Ok(allowed) => allowed,
			Err(err) => {
				warn!(org_id, member_id, "Permission check failed, denying: {}", err);
				false
			}
		}
	}

	/// Inserts or updates one permission row. An existing row gets its
	/// version bumped. `NotFound` if the member is not part of `org_id`.
	pub async fn set_permission(
		&self,
		org_id: &str,
		member_id: &str,
		perm: &NewPermission,
	) -> PbResult<Permission> {
		let res = self.meta.upsert_permission(org_id, member_id, perm).await?;
		self.cache.invalidate_member(org_id, member_id);
		Ok(res)
	}

	pub async fn initialize_default_permissions(
		&self,
		org_id: &str,
		member_id: &str,
		role: Role,
	) -> PbResult<()> {
		self.meta.insert_permissions(org_id, member_id, &default_permissions(role)).await
	}

	/// Replaces every permission row of the member with the role defaults
	pub async fn reset_permissions_to_role_defaults(
		&self,
		org_id: &str,
		member_id: &str,
		role: Role,
	) -> PbResult<()> {
		self.meta.replace_permissions(org_id, member_id, &default_permissions(role)).await?;
		self.cache.invalidate_member(org_id, member_id);
		Ok(())
	}

	pub async fn get_full_permission_matrix(
		&self,
		org_id: &str,
		member_id: &str,
	) -> PbResult<PermissionMatrix> {
		let perms = self.get_permissions_for_member(member_id, org_id, None).await?;

		let mut matrix: PermissionMatrix = Module::ALL
			.iter()
			.map(|m| (*m, Action::ALL.iter().map(|a| (*a, false)).collect()))
			.collect();
		for perm in perms.iter().filter(|p| p.scope == PermissionScope::Module) {
			if let Some(cell) = matrix.get_mut(&perm.module).and_then(|m| m.get_mut(&perm.action)) {
				*cell = perm.allowed;
			}
		}
		Ok(matrix)
	}

	/// Applies all updates in one transaction, then invalidates the member once.
	/// `NotFound` if the member is not part of `org_id`.
	pub async fn bulk_update_permissions(
		&self,
		org_id: &str,
		member_id: &str,
		updates: &[NewPermission],
	) -> PbResult<Vec<Permission>> {
		let res = self.meta.upsert_permissions(org_id, member_id, updates).await?;
		self.cache.invalidate_member(org_id, member_id);
		info!(org_id, member_id, "Bulk updated {} permissions", res.len());
		Ok(res)
	}

	/// Modules the member may read
	pub async fn get_accessible_modules(
		&self,
		member_id: &str,
		org_id: &str,
	) -> PbResult<Vec<Module>> {
		let matrix = self.get_full_permission_matrix(org_id, member_id).await?;
		Ok(matrix
			.into_iter()
			.filter(|(_, actions)| actions.get(&Action::Read).copied().unwrap_or(false))
			.map(|(module, _)| module)
			.collect())
	}

	// Cache
	//*******
	pub fn invalidate_member_cache(&self, org_id: &str, member_id: &str) {
		self.cache.invalidate_member(org_id, member_id);
	}

	pub fn invalidate_organization_cache(&self, org_id: &str) {
		self.cache.invalidate_organization(org_id);
		info!(org_id, "Permission cache invalidated for organization");
	}
}

// vim: ts=4
