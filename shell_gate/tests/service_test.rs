//! The request pipeline: policy, working directory containment, then execution.

use shell_gate::config::{SETTINGS_FILE_NAME, StaticSettings};
use shell_gate::policy::PolicyError;
use shell_gate::sandbox::SandboxError;
use shell_gate::utils::logging::init_test_logging;
use shell_gate::{AgentContext, CommandRequest, Denial, Settings, ShellGate, evaluate};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn scoped_settings(root: &std::path::Path) -> Settings {
    Settings {
        allowed_working_dirs: vec![root.display().to_string()],
        ..Settings::default()
    }
}

async fn deny(request: CommandRequest, settings: &Settings) -> Denial {
    evaluate(
        &request,
        settings,
        &AgentContext::default(),
        &CancellationToken::new(),
    )
    .await
    .expect_err("request should be denied")
}

#[tokio::test]
async fn test_empty_command_denied_first() {
    init_test_logging();
    let settings = Settings {
        allowed_working_dirs: vec!["/nowhere".into()],
        ..Settings::default()
    };
    let denial = deny(
        CommandRequest::new("").with_working_dir("/elsewhere"),
        &settings,
    )
    .await;
    assert_eq!(denial, Denial::Policy(PolicyError::EmptyCommand));
    assert_eq!(denial.kind(), "empty_command");
}

#[tokio::test]
async fn test_metacharacters_denied_before_patterns() {
    init_test_logging();
    let denial = deny(CommandRequest::new("sudo ls; pwd"), &Settings::default()).await;
    assert_eq!(denial, Denial::Policy(PolicyError::MetacharactersRejected));
}

#[tokio::test]
async fn test_block_list_wins_over_allow_list() {
    init_test_logging();
    let settings = Settings {
        allowed_patterns: vec!["sudo *".into()],
        ..Settings::default()
    };
    let denial = deny(CommandRequest::new("sudo ls"), &settings).await;
    assert_eq!(
        denial,
        Denial::Policy(PolicyError::BlockedPattern {
            pattern: "sudo *".into()
        })
    );
    assert_eq!(
        denial.to_string(),
        "command blocked by security policy: matches blocked pattern 'sudo *'"
    );
}

#[tokio::test]
async fn test_unlisted_command_denied_with_allowed_patterns() {
    init_test_logging();
    let settings = Settings {
        allowed_patterns: vec!["git *".into(), "pwd".into()],
        blocked_patterns: vec![],
        ..Settings::default()
    };
    let denial = deny(CommandRequest::new("python app.py"), &settings).await;
    assert_eq!(
        denial.to_string(),
        "command not in allowed list. Allowed patterns: ['git *', 'pwd']"
    );
}

#[tokio::test]
async fn test_working_dir_outside_scope_denied() {
    init_test_logging();
    let root = tempfile::tempdir().unwrap();
    let outside = tempfile::tempdir().unwrap();
    let denial = deny(
        CommandRequest::new("pwd").with_working_dir(outside.path().display().to_string()),
        &scoped_settings(root.path()),
    )
    .await;
    assert!(matches!(
        denial,
        Denial::Sandbox(SandboxError::WorkingDirNotAllowed { .. })
    ));
    assert_eq!(denial.kind(), "working_dir_not_allowed");
}

#[cfg(unix)]
#[tokio::test]
async fn test_allowed_command_runs_in_scope() {
    init_test_logging();
    let root = tempfile::tempdir().unwrap();
    let sub = root.path().join("project");
    std::fs::create_dir(&sub).unwrap();

    let result = evaluate(
        &CommandRequest::new("pwd").with_working_dir(sub.display().to_string()),
        &scoped_settings(root.path()),
        &AgentContext::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.working_dir, sub.display().to_string());
    assert!(result.stdout.trim_end().ends_with("project"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_agent_dir_is_working_dir_fallback() {
    init_test_logging();
    let agent = tempfile::tempdir().unwrap();
    let ctx = AgentContext {
        agent_dir: Some(agent.path().to_path_buf()),
    };
    let result = evaluate(
        &CommandRequest::new("pwd"),
        &Settings::default(),
        &ctx,
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(result.working_dir, agent.path().display().to_string());
}

#[cfg(unix)]
#[tokio::test]
async fn test_gate_with_static_settings() {
    init_test_logging();
    let settings = Settings {
        allowed_patterns: vec!["echo *".into()],
        allow_shell_metacharacters: true,
        ..Settings::default()
    };
    let gate = ShellGate::new(
        Arc::new(StaticSettings(settings)),
        AgentContext::default(),
    );

    let result = gate
        .handle(
            &CommandRequest::new("echo a && echo b"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(result.stdout, "a\nb\n");
    assert!(gate.check("ls").is_err());
}

#[test]
fn test_file_settings_are_reread_per_request() {
    init_test_logging();
    let agent = tempfile::tempdir().unwrap();
    let path = agent.path().join(SETTINGS_FILE_NAME);
    let gate = ShellGate::new(
        Arc::new(shell_gate::config::FileSettings::new(Vec::new())),
        AgentContext {
            agent_dir: Some(agent.path().to_path_buf()),
        },
    );

    // No file yet: built-in policy.
    assert!(gate.check("git status").is_ok());

    std::fs::write(&path, r#"{"allowed_patterns": "make *\nnpm test"}"#).unwrap();
    assert!(gate.check("git status").is_err());
    assert!(gate.check("npm test").is_ok());

    std::fs::write(
        &path,
        r#"{"allowed_patterns": ["git *"], "allow_shell_metacharacters": "true"}"#,
    )
    .unwrap();
    assert!(gate.check("git status | cat").is_ok());
}

#[test]
fn test_file_settings_fallback_path() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let fallback = dir.path().join("fallback.json");
    std::fs::write(&fallback, r#"{"blocked_patterns": ["git push*"]}"#).unwrap();

    let gate = ShellGate::new(
        Arc::new(shell_gate::config::FileSettings::new(vec![fallback])),
        AgentContext {
            agent_dir: Some(dir.path().join("agent-without-settings")),
        },
    );
    assert_eq!(
        gate.check("git push origin"),
        Err(PolicyError::BlockedPattern {
            pattern: "git push*".into()
        })
    );
    assert_eq!(gate.settings().blocked_patterns, vec!["git push*".to_string()]);
}
