//! Tests for CLI subcommand parsing.

use std::path::PathBuf;

use blacklist_monitor::config::{
    Cli, Command, LogFormat, HOSTNAMES_PAGE_SIZE, IMPORT_BATCH_DELAY_MS, IMPORT_BATCH_SIZE,
    JOB_POLL_INTERVAL_MS,
};
use clap::Parser;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("blacklist_monitor").chain(args.iter().copied()))
        .expect("arguments should parse")
}

#[test]
fn test_import_defaults() {
    let cli = parse(&["import", "ips.csv", "--tag", "prod", "--tag", "mail"]);
    let Command::Import(args) = &cli.command else {
        panic!("expected import, got {:?}", cli.command);
    };
    assert_eq!(args.file, PathBuf::from("ips.csv"));
    assert_eq!(args.tags, vec!["prod".to_string(), "mail".to_string()]);
    assert!(!args.dry_run);

    let config = cli.to_config();
    assert_eq!(config.import_batch_size, IMPORT_BATCH_SIZE);
    assert_eq!(config.import_batch_delay_ms, IMPORT_BATCH_DELAY_MS);
}

#[test]
fn test_import_overrides_flow_into_config() {
    let cli = parse(&[
        "import",
        "-",
        "--batch-size",
        "25",
        "--batch-delay-ms",
        "0",
        "--dry-run",
    ]);
    let config = cli.to_config();
    assert_eq!(config.import_batch_size, 25);
    assert_eq!(config.import_batch_delay_ms, 0);
    assert!(matches!(cli.command, Command::Import(ref a) if a.dry_run && a.file.as_os_str() == "-"));
}

#[test]
fn test_check_all_modes() {
    let cli = parse(&["check-all"]);
    let Command::CheckAll(args) = &cli.command else {
        panic!("expected check-all");
    };
    assert!(!args.resume && !args.cancel && !args.no_wait);
    assert_eq!(cli.to_config().poll_interval_ms, JOB_POLL_INTERVAL_MS);

    let cli = parse(&["check-all", "--resume", "--poll-interval-ms", "250"]);
    assert!(matches!(cli.command, Command::CheckAll(ref a) if a.resume));
    assert_eq!(cli.to_config().poll_interval_ms, 250);

    let cli = parse(&["check-all", "--cancel"]);
    assert!(matches!(cli.command, Command::CheckAll(ref a) if a.cancel));
}

#[test]
fn test_check_all_conflicting_flags_rejected() {
    let result = Cli::try_parse_from(["blacklist_monitor", "check-all", "--resume", "--cancel"]);
    assert!(result.is_err());

    let result = Cli::try_parse_from(["blacklist_monitor", "check-all", "--no-wait", "--resume"]);
    assert!(result.is_err());
}

#[test]
fn test_global_options_after_subcommand() {
    let cli = parse(&[
        "stats",
        "--api-url",
        "http://localhost:8000/api/v1",
        "--log-format",
        "json",
        "--status-port",
        "9090",
        "--timeout-seconds",
        "5",
    ]);
    let config = cli.to_config();
    assert_eq!(config.api_url, "http://localhost:8000/api/v1");
    assert!(matches!(config.log_format, LogFormat::Json));
    assert_eq!(config.status_port, Some(9090));
    assert_eq!(config.timeout_seconds, 5);
}

#[test]
fn test_bulk_check_requires_addresses() {
    assert!(Cli::try_parse_from(["blacklist_monitor", "bulk-check"]).is_err());

    let cli = parse(&["bulk-check", "1.1.1.1", "2.2.2.2"]);
    assert!(matches!(cli.command, Command::BulkCheck { ref ips } if ips.len() == 2));
}

#[test]
fn test_list_filters() {
    let cli = parse(&[
        "list",
        "--status",
        "blacklisted",
        "--tag",
        "mail",
        "--page",
        "3",
        "--sort-order",
        "desc",
    ]);
    let Command::List(args) = cli.command else {
        panic!("expected list");
    };
    assert_eq!(args.status.as_deref(), Some("blacklisted"));
    assert_eq!(args.tags, vec!["mail".to_string()]);
    assert_eq!(args.page, 3);
    assert_eq!(args.sort_order.as_deref(), Some("desc"));
}

#[test]
fn test_login_key_is_optional() {
    assert!(matches!(parse(&["login"]).command, Command::Login { api_key: None }));
    assert!(matches!(
        parse(&["login", "sk_live_123"]).command,
        Command::Login { api_key: Some(ref k) } if k == "sk_live_123"
    ));
}

#[test]
fn test_poll_interval_has_a_floor() {
    let result = Cli::try_parse_from(["blacklist_monitor", "check-all", "--poll-interval-ms", "0"]);
    assert!(result.is_err());

    let cli = parse(&["check-all", "--poll-interval-ms", "100"]);
    assert_eq!(cli.to_config().poll_interval_ms, 100);
}

#[test]
fn test_hostnames_defaults() {
    let cli = parse(&["hostnames", "--search", "mail"]);
    let Command::Hostnames {
        page,
        limit,
        search,
    } = cli.command
    else {
        panic!("expected hostnames");
    };
    assert_eq!(page, 1);
    assert_eq!(limit, HOSTNAMES_PAGE_SIZE);
    assert_eq!(search.as_deref(), Some("mail"));
}
