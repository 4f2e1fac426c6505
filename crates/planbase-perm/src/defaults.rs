//! Compiled-in default permission matrix
//!
//! Every role gets one row per (module, action) pair when a member is created
//! or reset to role defaults. Cells not listed for a role are denied.

use planbase_types::meta_adapter::NewPermission;

use crate::prelude::*;

const CRUD: &[Action] = &[Action::Read, Action::Create, Action::Update, Action::Delete];
const READ_WRITE: &[Action] = &[Action::Read, Action::Create, Action::Update];
const READ_ONLY: &[Action] = &[Action::Read];
const NO_ACCESS: &[Action] = &[];

type RoleDefaults = &'static [(Module, &'static [Action])];

/// Allowed actions per role and module
pub const DEFAULT_PERMISSIONS: &[(Role, RoleDefaults)] = &[
	(
		Role::Owner,
		&[
			(Module::Crm, CRUD),
			(Module::Projects, CRUD),
			(Module::Product, CRUD),
			(Module::Roadmap, CRUD),
			(Module::Tasks, CRUD),
			(Module::Notes, CRUD),
			(Module::Documents, CRUD),
			(Module::Profitability, CRUD),
		],
	),
	(
		Role::Admin,
		&[
			(Module::Crm, CRUD),
			(Module::Projects, CRUD),
			(Module::Product, CRUD),
			(Module::Roadmap, CRUD),
			(Module::Tasks, CRUD),
			(Module::Notes, CRUD),
			(Module::Documents, CRUD),
			(Module::Profitability, CRUD),
		],
	),
	(
		Role::Member,
		&[
			(Module::Crm, READ_WRITE),
			(Module::Projects, READ_WRITE),
			(Module::Product, READ_WRITE),
			(Module::Roadmap, READ_WRITE),
			(Module::Tasks, CRUD),
			(Module::Notes, CRUD),
			(Module::Documents, READ_WRITE),
			(Module::Profitability, READ_ONLY),
		],
	),
	(
		Role::Guest,
		&[
			(Module::Crm, READ_ONLY),
			(Module::Projects, READ_ONLY),
			(Module::Product, READ_ONLY),
			(Module::Roadmap, READ_ONLY),
			(Module::Tasks, READ_ONLY),
			(Module::Notes, READ_ONLY),
			(Module::Documents, READ_ONLY),
			(Module::Profitability, NO_ACCESS),
		],
	),
];

/// Actions a role may perform on a module by default
pub fn default_actions(role: Role, module: Module) -> &'static [Action] {
	DEFAULT_PERMISSIONS
		.iter()
		.find(|(r, _)| *r == role)
		.and_then(|(_, modules)| modules.iter().find(|(m, _)| *m == module))
		.map_or(NO_ACCESS, |(_, actions)| *actions)
}

/// Full module-level matrix for a role, one entry per module and action
pub fn default_permissions(role: Role) -> Vec<NewPermission> {
	let mut res = Vec::with_capacity(Module::ALL.len() * Action::ALL.len());
	for module in Module::ALL {
		let allowed_actions = default_actions(role, *module);
		for action in Action::ALL {
			res.push(NewPermission::new(*module, *action, allowed_actions.contains(action)));
		}
	}
	res
}


// vim: ts=4
