use super::config::Endpoints;
use super::core::traits::{FirstMirrorSelector, MirrorSelector, PatcherLauncher};
use super::error::InstallError;
use super::patcher::{MirrorCandidates, PatcherOutcome};
use super::*;
use crate::models::{NoopConfigStore, ReleaseAsset};
use crate::utils::version::tests::fake_version_resource;
use futures::future::BoxFuture;
use serde_json::json;
use std::sync::Mutex;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ---------------------------------------------------------------------
// MockProgressReporter – keeps what the pipeline reported
// ---------------------------------------------------------------------
#[derive(Default)]
struct MockProgressReporter {
    steps: Mutex<Vec<String>>,
    messages: Mutex<Vec<String>>,
    done: Mutex<Option<(bool, Option<String>)>>,
}

impl ProgressReporter for MockProgressReporter {
    fn start_step(&self, name: &str, _total_steps: Option<u32>) {
        self.steps.lock().unwrap().push(name.to_string());
    }
    fn update_bytes(&self, _transferred: u64, _total: Option<u64>) {}
    fn set_percent(&self, _percent: i32) {}
    fn set_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
    fn set_step_count(&self, _current: u32, _total: Option<u32>) {}
    fn set_substep(&self, _name: Option<&str>, _current: Option<u32>, _total: Option<u32>) {}
    fn done(&self, success: bool, message: Option<&str>) {
        *self.done.lock().unwrap() = Some((success, message.map(str::to_string)));
    }
}

/// Refuses every mirror
struct CancelSelector;

impl MirrorSelector for CancelSelector {
    fn select<'a>(
        &'a self,
        _release: &'a Release,
        _candidates: &'a MirrorCandidates,
    ) -> BoxFuture<'a, Option<String>> {
        Box::pin(async { None })
    }
}

/// Fails the test if the patcher is ever started
struct UnreachablePatcher;

impl PatcherLauncher for UnreachablePatcher {
    fn launch<'a>(
        &'a self,
        _exe: &'a Path,
        _working_dir: &'a Path,
        _args: &'a [&'a str],
    ) -> BoxFuture<'a, anyhow::Result<Option<i32>>> {
        panic!("patcher must not run")
    }
}

fn mod_release(body: &str, base: &str) -> Release {
    Release {
        name: "StayInTarkov 1.10".to_string(),
        tag_name: Some("1.10".to_string()),
        body: Some(body.to_string()),
        assets: vec![ReleaseAsset {
            name: "StayInTarkov-Release.zip".to_string(),
            browser_download_url: format!("{}/sit/StayInTarkov-Release.zip", base),
        }],
    }
}

fn endpoints(base: &str) -> Endpoints {
    Endpoints {
        patch_releases: format!("{}/patches", base),
        sit_releases: format!("{}/sit", base),
        server_releases: format!("{}/server", base),
        bepinex_package: format!("{}/bepinex.zip", base),
    }
}

fn game_at(root: &Path, product_version: &str) {
    std::fs::write(root.join("EscapeFromTarkov.exe"), fake_version_resource(product_version))
        .unwrap();
}

fn installer(
    config: ManagerConfig,
    base: &str,
    mirrors: Arc<dyn MirrorSelector>,
    reporter: Arc<MockProgressReporter>,
) -> Installer {
    Installer::new(config, Arc::new(NoopConfigStore), mirrors, reporter)
        .unwrap()
        .with_endpoints(endpoints(base))
        .with_patcher(Arc::new(UnreachablePatcher))
        .with_support_libraries(vec![
            SupportLibrary::new("Aki.Common.dll", b"common".to_vec()),
            SupportLibrary::new("Aki.Reflection.dll", b"reflection".to_vec()),
        ])
}

// ---------------------------------------------------------------------
// Configuration gate
// ---------------------------------------------------------------------
#[tokio::test]
async fn install_without_path_is_a_config_error() {
    let reporter = Arc::new(MockProgressReporter::default());
    let mut installer = installer(
        ManagerConfig::default(),
        "http://127.0.0.1:9",
        Arc::new(FirstMirrorSelector),
        reporter.clone(),
    );

    let err = installer
        .install_mod(&mod_release("0.14.1.2.29197", "http://127.0.0.1:9"))
        .await
        .unwrap_err();

    assert!(matches!(err, InstallError::ConfigError));
    let done = reporter.done.lock().unwrap().clone();
    assert_eq!(done.map(|(ok, _)| ok), Some(false));
}

#[tokio::test]
async fn install_without_support_libraries_is_refused() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let tmp = tempdir().unwrap();
    game_at(tmp.path(), "0.14.1.2-29197");
    let config = ManagerConfig {
        install_path: Some(tmp.path().to_path_buf()),
        ..Default::default()
    };
    let reporter = Arc::new(MockProgressReporter::default());
    let mut installer = installer(
        config,
        &server.uri(),
        Arc::new(FirstMirrorSelector),
        reporter.clone(),
    )
    .with_support_libraries(vec![SupportLibrary::new(
        "Aki.Common.dll",
        b"common".to_vec(),
    )]);

    let err = installer
        .install_mod(&mod_release("0.14.1.2.29197", &server.uri()))
        .await
        .unwrap_err();

    match err {
        InstallError::SupportLibrariesMissing { missing } => {
            assert_eq!(missing, vec!["Aki.Reflection.dll".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    let done = reporter.done.lock().unwrap().clone();
    assert_eq!(done.map(|(ok, _)| ok), Some(false));
    assert!(reporter.steps.lock().unwrap().is_empty());
    assert!(!tmp.path().join("SITLauncher").exists());
}

// ---------------------------------------------------------------------
// Version reconciliation
// ---------------------------------------------------------------------
#[tokio::test]
async fn matching_version_skips_the_patch_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/patches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let tmp = tempdir().unwrap();
    let config = ManagerConfig {
        install_path: Some(tmp.path().to_path_buf()),
        tarkov_version: Some("0.14.1.2.29197".to_string()),
        ..Default::default()
    };
    let mut installer = installer(
        config,
        &server.uri(),
        Arc::new(FirstMirrorSelector),
        Arc::new(MockProgressReporter::default()),
    );

    let steps = installer
        .reconcile_game_version(&mod_release("0.14.1.2.29197\n", &server.uri()))
        .await
        .unwrap();
    assert!(steps.is_empty());
}

#[tokio::test]
async fn same_build_with_different_version_string_needs_no_patch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/patches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let tmp = tempdir().unwrap();
    game_at(tmp.path(), "0.14.1.3-29197");
    let config = ManagerConfig {
        install_path: Some(tmp.path().to_path_buf()),
        ..Default::default()
    };
    let mut installer = installer(
        config,
        &server.uri(),
        Arc::new(FirstMirrorSelector),
        Arc::new(MockProgressReporter::default()),
    );

    let steps = installer
        .reconcile_game_version(&mod_release("0.14.1.2.29197", &server.uri()))
        .await
        .unwrap();

    assert!(steps.is_empty());
    assert_eq!(
        installer.config().tarkov_version.as_deref(),
        Some("0.14.1.3.29197")
    );
}

#[tokio::test]
async fn missing_first_hop_is_unresolvable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/patches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "30000 to 29197", "body": "", "assets": [] }
        ])))
        .mount(&server)
        .await;

    let tmp = tempdir().unwrap();
    game_at(tmp.path(), "0.14.1.2-31000");
    let config = ManagerConfig {
        install_path: Some(tmp.path().to_path_buf()),
        tarkov_version: Some("0.14.1.2.31000".to_string()),
        ..Default::default()
    };
    let mut installer = installer(
        config,
        &server.uri(),
        Arc::new(FirstMirrorSelector),
        Arc::new(MockProgressReporter::default()),
    );

    let err = installer
        .reconcile_game_version(&mod_release("0.14.1.2.29197", &server.uri()))
        .await
        .unwrap_err();

    match err {
        InstallError::ChainUnresolvable { installed, target } => {
            assert_eq!(installed, "31000");
            assert_eq!(target, "29197");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn unresolvable_chain_is_tolerated_when_mod_matches_target() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/patches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let tmp = tempdir().unwrap();
    let config = ManagerConfig {
        install_path: Some(tmp.path().to_path_buf()),
        tarkov_version: Some("0.14.1.2.31000".to_string()),
        sit_version: Some("1.10.8869.29197".to_string()),
        ..Default::default()
    };
    let mut installer = installer(
        config,
        &server.uri(),
        Arc::new(FirstMirrorSelector),
        Arc::new(MockProgressReporter::default()),
    );

    let steps = installer
        .reconcile_game_version(&mod_release("0.14.1.2.29197", &server.uri()))
        .await
        .unwrap();
    assert!(steps.is_empty());
}

#[tokio::test]
async fn empty_patch_catalog_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/patches"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let tmp = tempdir().unwrap();
    let config = ManagerConfig {
        install_path: Some(tmp.path().to_path_buf()),
        tarkov_version: Some("0.14.1.2.31000".to_string()),
        ..Default::default()
    };
    let mut installer = installer(
        config,
        &server.uri(),
        Arc::new(FirstMirrorSelector),
        Arc::new(MockProgressReporter::default()),
    );

    let err = installer
        .reconcile_game_version(&mod_release("0.14.1.2.29197", &server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, InstallError::CatalogEmpty));
}

// ---------------------------------------------------------------------
// Patch step failures
// ---------------------------------------------------------------------
fn patch_catalog(base: &str) -> serde_json::Value {
    json!([
        {
            "name": "31000 to 29197",
            "body": "",
            "assets": [
                { "name": "mirrors.json", "browser_download_url": format!("{}/mirrors.json", base) }
            ]
        }
    ])
}

#[tokio::test]
async fn cancelled_mirror_choice_stops_quietly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/patches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(patch_catalog(&server.uri())))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/mirrors.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Link": format!("{}/files/patcher.zip", server.uri()) }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/patcher.zip"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let tmp = tempdir().unwrap();
    let config = ManagerConfig {
        install_path: Some(tmp.path().to_path_buf()),
        tarkov_version: Some("0.14.1.2.31000".to_string()),
        ..Default::default()
    };
    let reporter = Arc::new(MockProgressReporter::default());
    let mut installer = installer(config, &server.uri(), Arc::new(CancelSelector), reporter.clone());

    let err = installer
        .install_mod(&mod_release("0.14.1.2.29197", &server.uri()))
        .await
        .unwrap_err();

    assert!(err.is_cancellation());
    match err {
        InstallError::PatchFailed { step, source } => {
            assert_eq!(step, "31000 to 29197");
            assert!(matches!(*source, InstallError::MirrorSelectionCancelled));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(*reporter.done.lock().unwrap(), Some((false, None)));
}

#[tokio::test]
async fn empty_mirror_manifest_is_no_mirrors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/patches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(patch_catalog(&server.uri())))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/mirrors.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let tmp = tempdir().unwrap();
    let config = ManagerConfig {
        install_path: Some(tmp.path().to_path_buf()),
        tarkov_version: Some("0.14.1.2.31000".to_string()),
        ..Default::default()
    };
    let mut installer = installer(
        config,
        &server.uri(),
        Arc::new(FirstMirrorSelector),
        Arc::new(MockProgressReporter::default()),
    );

    let err = installer
        .reconcile_game_version(&mod_release("0.14.1.2.29197", &server.uri()))
        .await
        .unwrap_err();

    let InstallError::PatchFailed { source, .. } = err else {
        panic!("expected a patch failure");
    };
    assert!(matches!(*source, InstallError::NoMirrors { .. }));
}

#[tokio::test]
async fn manifest_with_only_cloud_storage_links_is_no_mirrors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/patches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(patch_catalog(&server.uri())))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/mirrors.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Link": "https://mega.nz/file/abc#key" },
            { "Link": "https://www.mega.nz/file/def#key" }
        ])))
        .mount(&server)
        .await;

    let tmp = tempdir().unwrap();
    let config = ManagerConfig {
        install_path: Some(tmp.path().to_path_buf()),
        tarkov_version: Some("0.14.1.2.31000".to_string()),
        ..Default::default()
    };
    let mut installer = installer(
        config,
        &server.uri(),
        Arc::new(FirstMirrorSelector),
        Arc::new(MockProgressReporter::default()),
    );

    let err = installer
        .reconcile_game_version(&mod_release("0.14.1.2.29197", &server.uri()))
        .await
        .unwrap_err();

    let InstallError::PatchFailed { source, .. } = err else {
        panic!("expected a patch failure");
    };
    assert!(matches!(*source, InstallError::NoMirrors { .. }));
    assert!(!tmp.path().join("Patcher.zip").exists());
}

#[tokio::test]
async fn broken_patcher_archive_is_an_extract_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/patches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(patch_catalog(&server.uri())))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/mirrors.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Link": format!("{}/files/patcher.zip", server.uri()) }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/patcher.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not a zip".to_vec()))
        .mount(&server)
        .await;

    let tmp = tempdir().unwrap();
    let config = ManagerConfig {
        install_path: Some(tmp.path().to_path_buf()),
        tarkov_version: Some("0.14.1.2.31000".to_string()),
        ..Default::default()
    };
    let reporter = Arc::new(MockProgressReporter::default());
    let mut installer = installer(config, &server.uri(), Arc::new(FirstMirrorSelector), reporter.clone());

    let err = installer
        .install_mod(&mod_release("0.14.1.2.29197", &server.uri()))
        .await
        .unwrap_err();

    let InstallError::PatchFailed { source, .. } = &err else {
        panic!("expected a patch failure, got {:?}", err);
    };
    assert!(matches!(**source, InstallError::ExtractFailed { .. }));
    assert!(err.wants_log());
    assert!(reporter
        .messages
        .lock()
        .unwrap()
        .contains(&"Downloading 'Patcher.zip'".to_string()));
    assert!(!reporter
        .messages
        .lock()
        .unwrap()
        .iter()
        .any(|m| m.contains("StayInTarkov-Release.zip")));
}

#[test]
fn patcher_outcome_wraps_into_install_error() {
    let err = InstallError::PatchFailed {
        step: "31000 to 29197".to_string(),
        source: Box::new(InstallError::PatcherNonSuccess(PatcherOutcome::Failed)),
    };
    assert_eq!(err.to_string(), "Patch step 31000 to 29197 failed: Patcher failed.");
}
