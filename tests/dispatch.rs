//! End-to-end request handling against the in-memory runtime.

use std::sync::Arc;

use shellgate::error::INVALID_FORMAT_MESSAGE;
use shellgate::runtime::Call;
use shellgate::{Dispatcher, MemoryChannel, MemoryRuntime, OsRegistry, Session};
use tempfile::TempDir;

fn request(command: &str, hash: &str, exec: Option<&str>) -> String {
    let mut value = serde_json::json!({
        "instance_os": "centos",
        "command": command,
        "instance_hash": hash,
    });
    if let Some(exec) = exec {
        value["exec_command"] = serde_json::Value::String(exec.to_string());
    }
    value.to_string()
}

#[tokio::test]
async fn test_create_exec_delete_session() {
    let tmp = TempDir::new().unwrap();
    let runtime = Arc::new(MemoryRuntime::new().with_exec_output("bin\netc\nusr\n"));
    let dispatcher = Dispatcher::new(OsRegistry::default(), runtime.clone());
    let mut session = Session::new("client-1", tmp.path());
    let mut channel = MemoryChannel::new([
        request("CREATE", "abc", None),
        request("EXEC", "abc", Some("ls")),
        request("DELETE", "abc", None),
    ]);

    dispatcher
        .serve_session(&mut channel, &mut session)
        .await
        .unwrap();

    assert_eq!(
        channel.sent(),
        [
            "[0]".to_string(),
            r#"["bin","etc","usr",""]"#.to_string(),
            "[2]".to_string(),
        ]
    );
    assert_eq!(
        runtime.calls(),
        vec![
            Call::Build(
                "Dockerfile.centos".into(),
                "centos-demo".into(),
                "latest".into()
            ),
            Call::Run(
                "centos_demo_abc".into(),
                "centos-demo".into(),
                "latest".into()
            ),
            Call::Exec("name=^/?centos_demo_abc$".into(), "ls".into()),
            Call::Stop("name=^/?centos_demo_abc$".into()),
            Call::Remove("name=^/?centos_demo_abc$".into()),
            Call::RemoveImage("centos-demo".into(), "latest".into()),
        ]
    );
    assert!(!runtime.has_container("centos_demo_abc"));
    assert!(!runtime.has_image("centos-demo", "latest"));
}

#[tokio::test]
async fn test_lifecycle_failures_still_acknowledge() {
    let tmp = TempDir::new().unwrap();
    let dispatcher = Dispatcher::new(OsRegistry::default(), Arc::new(MemoryRuntime::failing()));
    let mut session = Session::new("client-1", tmp.path());
    let mut channel = MemoryChannel::new([
        request("CREATE", "abc", None),
        request("DELETE", "abc", None),
        request("EXEC", "abc", Some("ls")),
    ]);

    dispatcher
        .serve_session(&mut channel, &mut session)
        .await
        .unwrap();

    assert_eq!(channel.sent()[0], "[0]");
    assert_eq!(channel.sent()[1], "[2]");
    assert!(channel.sent()[2].starts_with("Runtime error"));
}

#[tokio::test]
async fn test_rejections_in_order() {
    let tmp = TempDir::new().unwrap();
    let dispatcher = Dispatcher::new(OsRegistry::default(), Arc::new(MemoryRuntime::new()));
    let mut session = Session::new("client-1", tmp.path());
    let mut channel = MemoryChannel::new([
        r#"{"instance_os":"centos","command":"CREATE"}"#,
        r#"{"instance_os":"windows","command":"REBOOT","instance_hash":"abc"}"#,
        r#"{"instance_os":"centos","command":"REBOOT","instance_hash":"abc"}"#,
        "[1, 2, 3]",
    ]);

    dispatcher
        .serve_session(&mut channel, &mut session)
        .await
        .unwrap();

    assert_eq!(
        channel.sent(),
        [
            INVALID_FORMAT_MESSAGE.to_string(),
            "Unsupported instance os: windows".to_string(),
            "Unsupported command: REBOOT".to_string(),
            INVALID_FORMAT_MESSAGE.to_string(),
        ]
    );
    assert_eq!(session.messages(), 4);
}

#[tokio::test]
async fn test_cd_moves_only_its_own_session() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("projects/demo")).unwrap();
    let dispatcher = Dispatcher::new(OsRegistry::default(), Arc::new(MemoryRuntime::new()));
    let mut first = Session::new("client-1", tmp.path());
    let second = Session::new("client-2", tmp.path());

    let mut channel = MemoryChannel::new([request("EXEC", "abc", Some("cd projects//demo"))]);
    dispatcher
        .serve_session(&mut channel, &mut first)
        .await
        .unwrap();

    let demo = tmp.path().join("projects/demo").canonicalize().unwrap();
    let base = tmp.path().canonicalize().unwrap();
    assert_eq!(first.directory().current(), demo);
    assert_eq!(second.directory().current(), base);
}

#[tokio::test]
async fn test_concurrent_create_and_delete_do_not_crash() {
    let tmp = TempDir::new().unwrap();
    let runtime = Arc::new(MemoryRuntime::new());
    let dispatcher = Dispatcher::new(OsRegistry::default(), runtime.clone());

    let mut tasks = Vec::new();
    for (i, command) in ["CREATE", "DELETE", "CREATE", "DELETE"].into_iter().enumerate() {
        let dispatcher = dispatcher.clone();
        let base = tmp.path().to_path_buf();
        tasks.push(tokio::spawn(async move {
            let mut session = Session::new(format!("client-{}", i), base);
            dispatcher
                .dispatch(&mut session, &request(command, "race", None))
                .await
        }));
    }

    for task in tasks {
        // Final container state is unspecified; every request still gets its status.
        let response = task.await.unwrap().unwrap();
        let json = response.to_json().unwrap();
        assert!(json == "[0]" || json == "[2]");
    }
}

#[tokio::test]
async fn test_instances_are_isolated_by_exact_name() {
    let tmp = TempDir::new().unwrap();
    let runtime = Arc::new(
        MemoryRuntime::new()
            .with_exec_output("secret\n")
            .with_running("centos_demo_abc")
            .with_running("postgres_prod"),
    );
    let dispatcher = Dispatcher::new(OsRegistry::default(), runtime.clone());
    let mut session = Session::new("client-2", tmp.path());
    let mut channel = MemoryChannel::new([
        request("EXEC", "ab", Some("cat /secret")),
        request("DELETE", "a", None),
        request("DELETE", "|", None),
        request("DELETE", ".*", None),
    ]);

    dispatcher
        .serve_session(&mut channel, &mut session)
        .await
        .unwrap();

    assert!(channel.sent()[0].starts_with("Runtime error"));
    assert!(!channel.sent()[0].contains("secret"));
    assert_eq!(channel.sent()[1], "[2]");
    assert_eq!(channel.sent()[2], "Invalid instance hash: |");
    assert_eq!(channel.sent()[3], "Invalid instance hash: .*");
    assert!(runtime.has_container("centos_demo_abc"));
    assert!(runtime.has_container("postgres_prod"));
    assert!(!runtime
        .calls()
        .iter()
        .any(|call| matches!(call, Call::Stop(f) if f.contains('|'))));
}
