//! Workspace behaviour when the remote drifts or cannot be reached, against
//! the mock SDK.

use ise_provider::lifecycle::{Action, Workspace};
use ise_provider::manifest::Manifest;
use ise_provider::resources::{Registry, TacacsProfile};
use ise_provider::ProviderError;
use ise_reconcile::mock::Call;
use ise_reconcile::{ApiError, CreateResponse, MockApi, RemoteObject};
use serde_json::json;
use std::collections::BTreeSet;

const SHELL: &str = r#"
    [[resource]]
    type = "ise_tacacs_profile"
    address = "shell"
    [resource.attributes]
    name = "shell-admin"
    description = "Privilege 15"
"#;

fn profile(id: &str) -> RemoteObject {
    RemoteObject {
        id: id.to_string(),
        attributes: serde_json::from_value(json!({
            "name": "shell-admin",
            "description": "Privilege 15",
        }))
        .unwrap(),
    }
}

fn workspace(mock: &MockApi) -> Workspace {
    let mut registry = Registry::new();
    registry.register::<TacacsProfile, _>(mock.clone());
    Workspace::new(registry)
}

#[tokio::test]
async fn failed_refresh_keeps_tracking_and_never_recreates() {
    let mut mock = MockApi::new();
    mock.expect_get_by_name("tacacsprofile", "shell-admin")
        .return_err(ApiError::NotFound);
    mock.expect_create("tacacsprofile").return_ok(CreateResponse {
        object: Some(profile("p1")),
        location: None,
    });
    mock.expect_get_by_id("tacacsprofile", "p1")
        .return_err(ApiError::Transport("connection reset".into()));

    let manifest: Manifest = SHELL.parse().unwrap();
    let mut workspace = workspace(&mock);

    let report = workspace.apply(&manifest).await.unwrap();
    assert_eq!(report.action("shell"), Some(&Action::Created));

    let err = workspace.apply(&manifest).await.unwrap_err();
    assert!(matches!(
        err,
        ProviderError::RefreshFailed { ref address, source: ApiError::Transport(_) }
            if address == "shell"
    ));
    assert_eq!(
        workspace.get("shell").and_then(|r| r.handle.id()),
        Some("p1")
    );

    mock.verify();
    assert!(!mock
        .calls()
        .iter()
        .skip(2)
        .any(|c| matches!(c, Call::Create { .. })));
}

#[tokio::test]
async fn failed_delete_keeps_the_resource_tracked() {
    let mut mock = MockApi::new();
    mock.expect_get_by_name("tacacsprofile", "shell-admin")
        .return_ok(profile("p7"));
    mock.expect_get_by_id("tacacsprofile", "p7")
        .return_ok(profile("p7"));
    mock.expect_delete("tacacsprofile", "p7").return_err(ApiError::Status {
        status: 500,
        message: "Internal Server Error".into(),
        body: Some(r#"{"ERSResponse":{"messages":[{"title":"db locked"}]}}"#.into()),
    });

    let manifest: Manifest = SHELL.parse().unwrap();
    let mut workspace = workspace(&mock);

    let report = workspace.apply(&manifest).await.unwrap();
    assert_eq!(report.action("shell"), Some(&Action::Adopted));

    let err = workspace.destroy().await.unwrap_err();
    let (address, source) = match err {
        ProviderError::Reconcile { address, source } => (address, source),
        other => panic!("expected a reconcile error, got {other:?}"),
    };
    assert_eq!(address, "shell");
    assert!(source.response_body().unwrap().contains("db locked"));
    assert_eq!(workspace.resources().len(), 1);

    mock.verify();
}

#[tokio::test]
async fn field_cleared_remotely_is_pushed_back() {
    let mut mock = MockApi::new();
    mock.expect_get_by_name("tacacsprofile", "shell-admin")
        .return_err(ApiError::NotFound);
    mock.expect_create("tacacsprofile").return_ok(CreateResponse {
        object: Some(profile("p1")),
        location: None,
    });
    let mut drifted = profile("p1");
    drifted.attributes.remove("description");
    mock.expect_get_by_id("tacacsprofile", "p1")
        .return_ok(drifted);
    mock.expect_update("tacacsprofile", "p1")
        .return_ok(profile("p1"));
    mock.expect_get_by_id("tacacsprofile", "p1")
        .return_ok(profile("p1"));

    let manifest: Manifest = SHELL.parse().unwrap();
    let mut workspace = workspace(&mock);
    workspace.apply(&manifest).await.unwrap();

    let report = workspace.apply(&manifest).await.unwrap();
    assert_eq!(
        report.action("shell"),
        Some(&Action::Updated(BTreeSet::from(["description".to_string()])))
    );
    assert_eq!(
        workspace.get("shell").unwrap().attributes["description"],
        json!("Privilege 15")
    );

    mock.verify();
    let calls = mock.calls();
    assert!(matches!(
        &calls[3],
        Call::Update { id, payload, .. }
            if id == "p1" && payload["description"] == json!("Privilege 15")
    ));
}

#[tokio::test]
async fn failed_update_after_adopt_is_adopted_again_next_time() {
    let mut mock = MockApi::new();
    let mut stale = profile("p3");
    stale.attributes.remove("description");
    mock.expect_get_by_name("tacacsprofile", "shell-admin")
        .return_ok(stale);
    mock.expect_update("tacacsprofile", "p3")
        .return_err(ApiError::Transport("connection reset".into()));
    mock.expect_get_by_name("tacacsprofile", "shell-admin")
        .return_ok(profile("p3"));

    let manifest: Manifest = SHELL.parse().unwrap();
    let mut workspace = workspace(&mock);

    let err = workspace.apply(&manifest).await.unwrap_err();
    assert!(matches!(err, ProviderError::Reconcile { ref address, .. } if address == "shell"));
    assert!(workspace.get("shell").is_none());

    let report = workspace.apply(&manifest).await.unwrap();
    assert_eq!(report.action("shell"), Some(&Action::Adopted));
    assert_eq!(
        workspace.get("shell").and_then(|r| r.handle.id()),
        Some("p3")
    );
    mock.verify();
}
