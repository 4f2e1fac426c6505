//! End-to-end wiring tests

use serde_json::json;
use tempfile::TempDir;

use planbase::config::ConfigSource;
use planbase::config_types::ConfigScope;
use planbase::meta_adapter::{CreateMember, NewPermission};
use planbase::rbac::{Action, Module, Role};
use planbase::{App, AppBuilder, AppBuilderOpts};

async fn create_test_app() -> (App, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let mut builder = AppBuilder::from_opts(AppBuilderOpts::default());
	builder.db_path(temp_dir.path().join("nested/planbase.db"));
	let app = builder.build().await.expect("Failed to build app");
	(app, temp_dir)
}

#[tokio::test]
async fn test_build_creates_database() {
	let (app, temp) = create_test_app().await;
	assert!(temp.path().join("nested/planbase.db").exists());
	assert!(app.opts.strapi_url.is_none());
}

#[tokio::test]
async fn test_permissions_through_app() {
	let (app, _temp) = create_test_app().await;

	let member = app
		.permissions
		.create_member(&CreateMember {
			organization_id: "org-1".into(),
			user_id: "user-1".into(),
			role: Role::Guest,
		})
		.await
		.unwrap();
	assert!(app.permissions.check_permission(&member.id, "org-1", Module::Crm, Action::Read, None).await);
	assert!(
		!app.permissions.check_permission(&member.id, "org-1", Module::Crm, Action::Update, None).await
	);

	app.permissions
		.set_permission("org-1", &member.id, &NewPermission::new(Module::Crm, Action::Update, true))
		.await
		.unwrap();
	assert!(app.permissions.check_permission(&member.id, "org-1", Module::Crm, Action::Update, None).await);
	// Other organization never matches
	assert!(!app.permissions.check_permission(&member.id, "org-2", Module::Crm, Action::Read, None).await);
}

#[tokio::test]
async fn test_config_through_app() {
	let (app, _temp) = create_test_app().await;

	let config = app.config.resolve_config(Some("acc-1"), None, None).await;
	assert!(!config.meta.strapi_available);
	assert_eq!(config.effective["task.priorities"], json!(["low", "medium", "high"]));

	app.config
		.update_setting("task.priorities", &json!(["high"]), ConfigScope::Account, Some("acc-1"), None)
		.await
		.unwrap();
	let config = app.config.resolve_config(Some("acc-1"), None, None).await;
	assert_eq!(config.effective["task.priorities"], json!(["high"]));
	assert_eq!(config.sources["task.priorities"].source, ConfigSource::Db);
}

// vim: ts=4
