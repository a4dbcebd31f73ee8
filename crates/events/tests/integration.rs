//! Integration tests for events

use std::time::Duration;

use llvmpkg_errors::{BuildError, Error};
use llvmpkg_events::*;

#[tokio::test]
async fn emitted_events_arrive_in_order() {
    let (tx, mut rx) = channel();

    tx.emit_warning("test warning");
    tx.emit_debug("test debug");
    tx.emit_stage_started(Stage::Fetch, "llvm/3.8.0");

    let event1 = rx.recv().await.unwrap();
    assert!(matches!(
        event1,
        AppEvent::General(GeneralEvent::Warning { .. })
    ));

    let event2 = rx.recv().await.unwrap();
    assert!(matches!(
        event2,
        AppEvent::General(GeneralEvent::DebugLog { .. })
    ));

    let event3 = rx.recv().await.unwrap();
    match event3 {
        AppEvent::Build(BuildEvent::StageStarted { stage, package }) => {
            assert_eq!(stage, Stage::Fetch);
            assert_eq!(package, "llvm/3.8.0");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn dropped_receiver_does_not_panic() {
    let (tx, rx) = channel();
    drop(rx);

    tx.emit_warning("ignored");
}

#[tokio::test]
async fn stage_failure_carries_user_code() {
    let (tx, mut rx) = channel();
    let err: Error = BuildError::BuildToolFailed {
        step: "compile".into(),
        program: "cmake".into(),
        code: Some(2),
    }
    .into();

    tx.emit_stage_failed(Stage::Build, "llvm/3.8.0", &err);

    match rx.recv().await.unwrap() {
        AppEvent::Build(BuildEvent::StageFailed { failure, .. }) => {
            assert_eq!(failure.code.as_deref(), Some("build.build_tool_failed"));
            assert!(failure.message.contains("compile"));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn operation_failure_carries_user_code() {
    let (tx, mut rx) = channel();
    let err: Error = BuildError::MissingComponent {
        feature: "LLVM_TOOL_CLANG_BUILD".into(),
        component: "cfe".into(),
    }
    .into();

    tx.emit_operation_failed("run llvm/3.8.0", &err);

    let event = rx.recv().await.unwrap();
    assert_eq!(event.level(), tracing::Level::ERROR);
    match event {
        AppEvent::General(GeneralEvent::OperationFailed { operation, failure }) => {
            assert_eq!(operation, "run llvm/3.8.0");
            assert_eq!(failure.code.as_deref(), Some("build.missing_component"));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn levels_follow_severity() {
    let warn = AppEvent::General(GeneralEvent::warning("w"));
    assert_eq!(warn.level(), tracing::Level::WARN);

    let done = AppEvent::Download(DownloadEvent::Completed {
        url: "http://x".into(),
        component: None,
        bytes_downloaded: 1,
        duration: Duration::from_millis(1),
    });
    assert_eq!(done.level(), tracing::Level::INFO);
}

#[test]
fn events_serialize_with_domain_tag() {
    let event = AppEvent::Build(BuildEvent::ToolInvoked {
        step: ToolStep::Configure,
        program: "cmake".into(),
        args: vec!["-G".into(), "Unix Makefiles".into()],
    });
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["domain"], "build");
    assert_eq!(json["event"]["type"], "ToolInvoked");
    assert_eq!(json["event"]["step"], "configure");
}
