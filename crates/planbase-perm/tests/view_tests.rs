//! Module view and role view template tests

mod common;

use common::{create_test_resolver, new_member};
use planbase_types::meta_adapter::UpdateModuleView;
use planbase_types::rbac::{Module, Role};
use planbase_types::types::Patch;
use serde_json::json;

#[tokio::test]
async fn test_apply_guest_template_reaches_current_guests() {
	let (resolver, _temp) = create_test_resolver().await;
	let g1 = resolver.create_member(&new_member("org-1", "g1", Role::Guest)).await.unwrap();
	let g2 = resolver.create_member(&new_member("org-1", "g2", Role::Guest)).await.unwrap();
	let m1 = resolver.create_member(&new_member("org-1", "m1", Role::Member)).await.unwrap();
	let other = resolver.create_member(&new_member("org-2", "g3", Role::Guest)).await.unwrap();

	let cfg = json!({"hiddenSubviews": ["crm.pipeline"]});
	let count = resolver.apply_guest_view_template_to_all("org-1", Module::Crm, &cfg).await.unwrap();
	assert_eq!(count, 2);

	for guest in [&g1, &g2] {
		let view = resolver.get_module_view_with_org(&guest.id, "org-1", Module::Crm).await.unwrap();
		assert_eq!(view.map(|v| v.config), Some(cfg.clone()));
	}
	assert!(resolver.get_module_view(&m1.id, Module::Crm).await.unwrap().is_none());
	assert!(resolver.get_module_view(&other.id, Module::Crm).await.unwrap().is_none());

	// Added after the fan-out: not affected
	let late = resolver.create_member(&new_member("org-1", "g4", Role::Guest)).await.unwrap();
	assert!(resolver.get_module_view(&late.id, Module::Crm).await.unwrap().is_none());
}

#[tokio::test]
async fn test_apply_with_no_members() {
	let (resolver, _temp) = create_test_resolver().await;
	let count =
		resolver.apply_member_view_template_to_all("org-1", Module::Notes, &json!({})).await.unwrap();
	assert_eq!(count, 0);
}

#[tokio::test]
async fn test_templates_per_role() {
	let (resolver, _temp) = create_test_resolver().await;

	resolver.set_guest_view_template("org-1", Module::Tasks, &json!({"readonly": true})).await.unwrap();
	resolver.set_member_view_template("org-1", Module::Tasks, &json!({"readonly": false})).await.unwrap();

	let guest = resolver.get_guest_view_template("org-1", Module::Tasks).await.unwrap().unwrap();
	assert_eq!(guest.role, Role::Guest);
	assert_eq!(guest.config, json!({"readonly": true}));
	let member = resolver.get_member_view_template("org-1", Module::Tasks).await.unwrap().unwrap();
	assert_eq!(member.config, json!({"readonly": false}));
	assert!(resolver.get_guest_view_template("org-2", Module::Tasks).await.unwrap().is_none());
}

#[tokio::test]
async fn test_set_module_view() {
	let (resolver, _temp) = create_test_resolver().await;
	let member = resolver.create_member(&new_member("org-1", "kim", Role::Member)).await.unwrap();

	let update = UpdateModuleView { layout: Patch::Value("board".into()), ..Default::default() };
	let view = resolver.set_module_view(&member.id, Module::Roadmap, &update).await.unwrap().unwrap();
	assert_eq!(view.organization_id.as_ref(), "org-1");
	assert_eq!(view.layout.as_deref(), Some("board"));

	assert!(resolver.set_module_view("nobody", Module::Roadmap, &update).await.unwrap().is_none());
}

#[tokio::test]
async fn test_set_module_view_with_org_is_tenant_scoped() {
	let (resolver, _temp) = create_test_resolver().await;
	let member = resolver.create_member(&new_member("org-1", "lee", Role::Member)).await.unwrap();
	let update = UpdateModuleView { config: Some(json!({"x": 1})), ..Default::default() };

	let res = resolver
		.set_module_view_with_org(&member.id, "org-2", Module::Crm, &update)
		.await
		.unwrap();
	assert!(res.is_none());
	assert!(resolver.get_module_view(&member.id, Module::Crm).await.unwrap().is_none());

	let res = resolver
		.set_module_view_with_org(&member.id, "org-1", Module::Crm, &update)
		.await
		.unwrap();
	assert_eq!(res.map(|v| v.config), Some(json!({"x": 1})));
}

// vim: ts=4
