//! Unit tests for argument handling and the runtime entry point.

use std::ffi::OsString;
use std::fs;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use rstest::rstest;

use crate::cli::{Cli, Command};
use crate::run;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args.iter().copied()).expect("arguments parse")
}

fn run_captured(args: &[&str]) -> (ExitCode, String, String) {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let code = run(args.iter().copied(), &mut stdout, &mut stderr);
    (
        code,
        String::from_utf8(stdout).expect("utf-8 stdout"),
        String::from_utf8(stderr).expect("utf-8 stderr"),
    )
}

fn strings(arguments: &[OsString]) -> Vec<String> {
    arguments
        .iter()
        .map(|argument| argument.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn scan_flags_become_loader_arguments() {
    let cli = parse(&[
        "hintweave",
        "--log-format",
        "json",
        "--config-path",
        "alt.toml",
        "scan",
        "src",
        "--rules",
        "a.hint",
        "--rules",
        "more",
        "--no-bundled",
        "--format",
        "csv",
        "--source-version",
        "17",
    ]);
    assert!(matches!(&cli.command, Command::Scan(args) if args.paths == [Utf8PathBuf::from("src")]));
    assert!(cli.skips_bundled());
    assert_eq!(
        strings(&cli.config_arguments()),
        [
            "hintweave",
            "--config-path",
            "alt.toml",
            "--log-format",
            "json",
            "--report-format",
            "csv",
            "--source-version",
            "17",
            "--rule-paths",
            "a.hint",
            "--rule-paths",
            "more",
        ]
    );
}

#[rstest]
#[case(&["hintweave", "--config-path", "x.toml", "apply", "A.java", "--write"])]
#[case(&["hintweave", "--config-path", "x.toml", "check", "rules.hint"])]
#[case(&["hintweave", "--config-path", "x.toml", "list"])]
fn unset_flags_stay_out_of_loader_arguments(#[case] args: &[&str]) {
    let cli = parse(args);
    assert!(!cli.skips_bundled());
    assert_eq!(strings(&cli.config_arguments()), ["hintweave", "--config-path", "x.toml"]);
}

#[test]
fn global_flags_follow_the_subcommand() {
    let cli = parse(&["hintweave", "list", "--log-filter", "debug", "--config-path", "alt.toml"]);
    assert_eq!(cli.config_path, Some(Utf8PathBuf::from("alt.toml")));
    assert_eq!(
        strings(&cli.config_arguments()),
        ["hintweave", "--config-path", "alt.toml", "--log-filter", "debug"]
    );
}

#[test]
fn unreadable_configuration_is_reported() {
    let (code, _, stderr) = run_captured(&[
        "hintweave",
        "--config-path",
        "/nonexistent/hintweave.toml",
        "list",
    ]);
    assert_eq!(code, ExitCode::FAILURE);
    assert!(stderr.contains("failed to load configuration"), "{stderr}");
}

#[rstest]
#[case(&["hintweave"])]
#[case(&["hintweave", "scan"])]
#[case(&["hintweave", "scan", "A.java", "--format", "xml"])]
fn usage_errors_exit_with_status_two(#[case] args: &[&str]) {
    let (code, stdout, stderr) = run_captured(args);
    assert_eq!(code, ExitCode::from(2));
    assert!(stdout.is_empty());
    assert!(!stderr.is_empty());
}

#[test]
fn help_goes_to_stdout() {
    let (code, stdout, _) = run_captured(&["hintweave", "--help"]);
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(stdout.contains("scan"));
    assert!(stdout.contains("check"));
}

#[test]
fn check_counts_rules_and_fails_on_broken_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let good_path = dir.path().join("good.hint");
    let broken_path = dir.path().join("broken.hint");
    fs::write(&good_path, "System.gc()\n;;\n$a + 0\n=> $a\n;;\n").expect("write");
    fs::write(&broken_path, "<!colour: red>\n").expect("write");
    let good = good_path.to_str().expect("utf-8 path");
    let broken = broken_path.to_str().expect("utf-8 path");

    let (passed, stdout, _) = run_captured(&["hintweave", "--log-filter", "off", "check", good]);
    assert_eq!(passed, ExitCode::SUCCESS);
    assert_eq!(stdout, format!("{good}: 2 rule(s)\n"));

    let (failed, _, stderr) = run_captured(&["hintweave", "--log-filter", "off", "check", good, broken]);
    assert_eq!(failed, ExitCode::FAILURE);
    assert!(stderr.contains("colour"), "{stderr}");
    assert!(stderr.contains("1 of 2 inputs failed"), "{stderr}");
}
