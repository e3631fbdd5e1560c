//! Config file, CLI merge, error aggregation and output encoding.

use circlesift::engine::Cli;
use circlesift::pipeline::ScanErrors;
use circlesift::utils::{apply_file_to_cli, parse_scan_toml};
use circlesift::{
    Branch, BranchError, Chunk, CircleCiMetadata, Project, ScanError, SourceMetadata, SourceType,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

fn acme_api() -> Project {
    Project {
        vcs: "github".to_string(),
        username: "acme".to_string(),
        reponame: "api".to_string(),
    }
}

// --- config file / CLI ---

#[test]
fn test_cli_defaults() {
    let cli = Cli::try_parse_from(["circlesift"]).unwrap();
    assert_eq!(cli.name(), "circleci");
    assert_eq!(cli.concurrency(), 8);
    assert_eq!(cli.channel_cap(), 64);
    assert!(!cli.verbose());
    assert!(!cli.verify());
    let opts = cli.client_opts();
    assert_eq!(opts.base_url, "https://circleci.com/api/v1.1/");
    assert_eq!(opts.retry_attempts, 3);
    assert_eq!(cli.config_path(), PathBuf::from(".circlesift.toml"));
}

#[test]
fn test_cli_flags() {
    let cli = Cli::try_parse_from(["circlesift", "-j", "3", "--verify", "-v", "false", "-o", "out.jsonl"])
        .unwrap();
    assert_eq!(cli.concurrency(), 3);
    assert!(cli.verify());
    assert!(!cli.verbose());
    assert_eq!(cli.output, Some(PathBuf::from("out.jsonl")));
}

#[test]
fn test_parse_scan_toml() {
    let file = parse_scan_toml(
        r#"
[settings]
name = "prod-ci"
concurrency = 16
verify = true
retries = 5
output = "chunks.jsonl"
"#,
    )
    .unwrap();
    assert_eq!(file.settings.name.as_deref(), Some("prod-ci"));
    assert_eq!(file.settings.concurrency, Some(16));
    assert_eq!(file.settings.retries, Some(5));
    assert_eq!(file.settings.timeout, None);
}

#[test]
fn test_parse_scan_toml_rejects_unknown_keys() {
    assert!(parse_scan_toml("[settings]\nconcurency = 4\n").is_err());
}

#[test]
fn test_parse_scan_toml_empty() {
    let file = parse_scan_toml("").unwrap();
    assert!(file.settings.name.is_none());
}

#[test]
fn test_cli_flags_override_file() {
    let file = parse_scan_toml(
        "[settings]\nname = \"from-file\"\nconcurrency = 16\ntimeout = 90\noutput = \"file.jsonl\"\n",
    )
    .unwrap();
    let mut cli = Cli::try_parse_from(["circlesift", "--concurrency", "2"]).unwrap();
    apply_file_to_cli(&file, &mut cli);

    assert_eq!(cli.concurrency(), 2);
    assert_eq!(cli.name(), "from-file");
    assert_eq!(cli.client_opts().timeout_secs, 90);
    assert_eq!(cli.output, Some(PathBuf::from("file.jsonl")));
}

// --- error aggregation ---

#[test]
fn test_scan_errors_collects_from_many_threads() {
    let errors = Arc::new(ScanErrors::with_capacity(4));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let errors = Arc::clone(&errors);
            thread::spawn(move || {
                errors.add(BranchError::new(
                    Branch::ListSteps(acme_api(), i),
                    ScanError::Transport {
                        url: format!("u{i}"),
                        reason: "reset".to_string(),
                    },
                ));
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(errors.count(), 8);
    let mut builds: Vec<u64> = errors
        .take()
        .iter()
        .map(|e| match &e.branch {
            Branch::ListSteps(_, n) => *n,
            other => panic!("unexpected branch {other:?}"),
        })
        .collect();
    builds.sort();
    assert_eq!(builds, (0..8).collect::<Vec<u64>>());
}

#[test]
fn test_branch_error_message_names_branch() {
    let err = BranchError::new(
        Branch::FetchLog {
            project: acme_api(),
            build_num: 42,
            step: "test".to_string(),
            action_index: 2,
        },
        ScanError::Auth {
            status: 403,
            url: "https://logs/x".to_string(),
        },
    );
    let msg = err.to_string();
    assert!(msg.contains("github/acme/api"), "{msg}");
    assert!(msg.contains("build 42"), "{msg}");
    assert!(msg.contains("action 2"), "{msg}");
    assert!(msg.contains("403"), "{msg}");
    assert_eq!(err.branch.project(), &acme_api());
}

// --- output encoding ---

#[test]
fn test_chunk_json_line_shape() {
    let chunk = Chunk {
        source_type: SourceType::CircleCi,
        source_name: "ci".to_string(),
        source_id: 1,
        data: b"line1\nline3".to_vec(),
        source_metadata: SourceMetadata::CircleCi(CircleCiMetadata {
            vcs_type: "github".to_string(),
            username: "acme".to_string(),
            repository: "api".to_string(),
            build_number: 42,
            build_step: "test".to_string(),
            link: "https://app.circleci.com/pipelines/github/acme/api/42".to_string(),
        }),
        verify: false,
    };
    let v = serde_json::to_value(&chunk).unwrap();
    assert_eq!(v["source_type"], "circle_ci");
    assert_eq!(v["data"], "line1\nline3");
    assert_eq!(v["source_metadata"]["circle_ci"]["build_number"], 42);
    assert_eq!(v["source_metadata"]["circle_ci"]["build_step"], "test");
}

#[test]
fn test_package_paths_follow_crate_name() {
    let paths = circlesift::utils::PackagePaths::get();
    assert_eq!(paths.pkg_name(), "circlesift");
    assert_eq!(paths.config_filename(), ".circlesift.toml");
}
