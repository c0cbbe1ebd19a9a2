//! Subcommand dispatch and terminal output.

use std::path::Path;

use anyhow::{bail, Context, Result};
use colored::{ColoredString, Colorize};
use log::info;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

use crate::api::{CheckJob, CheckResult, IpListParams, IpRecord, IpStatus, IpUpdate, PageParams};
use crate::config::{Cli, Command, ImportArgs, API_KEY_ENV};
use crate::export::{default_stats_filename, export_stats_csv};
use crate::parse::{
    is_valid_ip_address, parse_candidates, validate_description, validate_ip_form, validate_name,
    validate_tags,
};
use crate::session::{login, logout};

use super::check_all::{run_check_all, CheckAllMode};
use super::import::run_import;
use super::init::init_resources;
use super::resources::ClientResources;

/// Runs the parsed command line.
///
/// `cancel` is the invocation-wide token (typically cancelled on Ctrl-C); a
/// running import stops before its next batch and a followed job is
/// detached.
///
/// # Errors
///
/// Returns an error when the command fails; the message is meant for the
/// user.
pub async fn run_cli(cli: Cli, cancel: CancellationToken) -> Result<()> {
    let config = cli.to_config();
    // `login` always writes the credential file, never an env/flag key.
    let api_key = match cli.command {
        Command::Login { .. } => None,
        _ => cli.global.api_key.as_deref(),
    };
    let resources = init_resources(config, api_key, cancel)?;

    match cli.command {
        Command::Login { api_key } => cmd_login(&resources, api_key).await,
        Command::Logout => {
            logout(&resources.api);
            println!("Logged out");
            Ok(())
        }
        Command::Health => {
            let health = resources.api.health().await?;
            let status = if health.is_healthy() {
                health.status.green()
            } else {
                health.status.red()
            };
            match health.version {
                Some(version) => println!("Backend {} (version {})", status, version),
                None => println!("Backend {}", status),
            }
            Ok(())
        }
        command => {
            require_key(&resources)?;
            run_authenticated(&resources, command).await
        }
    }
}

fn require_key(resources: &ClientResources) -> Result<()> {
    if !resources.session.has_key() {
        bail!(
            "Not logged in. Run `blacklist_monitor login` or set {}",
            API_KEY_ENV
        );
    }
    Ok(())
}

async fn cmd_login(resources: &ClientResources, api_key: Option<String>) -> Result<()> {
    let key = match api_key {
        Some(key) => key,
        None => {
            eprint!("API key: ");
            let mut line = String::new();
            std::io::stdin()
                .read_line(&mut line)
                .context("Failed to read API key from stdin")?;
            line
        }
    };
    login(&resources.api, &key).await?;
    println!("{} Logged in", "✓".green());
    Ok(())
}

async fn run_authenticated(resources: &ClientResources, command: Command) -> Result<()> {
    let api = resources.cached();

    match command {
        Command::List(args) => {
            let params = IpListParams {
                page: Some(args.page),
                limit: Some(args.limit),
                search: args.search,
                status: args.status,
                tags: args.tags,
                sort_by: args.sort_by,
                sort_order: args.sort_order,
            };
            let page = api.list_ips(&params).await?;
            for record in &page.items {
                print_record_line(record);
            }
            println!(
                "Page {} of {} ({} addresses)",
                args.page,
                page.total_pages(args.limit).max(1),
                page.total
            );
        }
        Command::Hostnames {
            page,
            limit,
            search,
        } => {
            let params = IpListParams {
                page: Some(page),
                limit: Some(limit),
                search,
                ..IpListParams::default()
            };
            let listing = api.list_ips(&params).await?;
            for record in &listing.items {
                print_hostname_line(record);
            }
            println!(
                "Page {} of {} ({} addresses)",
                page,
                listing.total_pages(limit).max(1),
                listing.total
            );
        }
        Command::Show { ip } => {
            let record = api.get_ip(&ip).await?;
            print_record(&record);
        }
        Command::Add(args) => {
            let form = validate_ip_form(
                &args.ip,
                args.name.as_deref(),
                args.description.as_deref(),
                &args.tags,
            )?;
            let record = api.add_ip(&form).await?;
            println!("{} Added {}", "✓".green(), record.ip_address);
        }
        Command::Update(args) => {
            if !is_valid_ip_address(&args.ip) {
                bail!("Invalid IP address format");
            }
            let tags = validate_tags(&args.tags)?;
            let update = IpUpdate {
                name: validate_name(args.name.as_deref())?,
                description: validate_description(args.description.as_deref())?,
                tags: (!tags.is_empty()).then_some(tags),
            };
            if update.is_empty() {
                bail!("Nothing to update; pass --name, --description or --tag");
            }
            let record = api.update_ip(args.ip.trim(), &update).await?;
            println!("{} Updated {}", "✓".green(), record.ip_address);
        }
        Command::Delete { ip } => {
            let ack = api.delete_ip(&ip).await?;
            println!(
                "{} {}",
                "✓".green(),
                ack.message.unwrap_or_else(|| format!("Deleted {}", ip))
            );
        }
        Command::Check { ip } => {
            let result = api.check_ip(&ip).await?;
            print_check_result(&result);
        }
        Command::BulkCheck { ips } => {
            let response = api.bulk_check(&ips).await?;
            for result in &response.results {
                print_check_result(result);
            }
        }
        Command::History { ip, page, limit } => {
            let history = api
                .ip_history(
                    &ip,
                    PageParams {
                        page: Some(page),
                        limit: Some(limit),
                    },
                )
                .await?;
            for entry in &history.items {
                println!(
                    "{}  {}  {} listing(s)",
                    entry.checked_at.as_deref().unwrap_or("-"),
                    paint_status(entry.status),
                    entry.listing_count()
                );
            }
            println!("{} check(s) in total", history.total);
        }
        Command::Mute { ip } => {
            api.mute_ip(&ip).await?;
            println!("{} Notifications muted for {}", "✓".green(), ip);
        }
        Command::Unmute { ip } => {
            api.unmute_ip(&ip).await?;
            println!("{} Notifications unmuted for {}", "✓".green(), ip);
        }
        Command::Import(args) => cmd_import(resources, args).await?,
        Command::CheckAll(args) => {
            let mode = if args.cancel {
                CheckAllMode::Cancel
            } else if args.resume {
                CheckAllMode::Resume
            } else {
                CheckAllMode::Start {
                    wait: !args.no_wait,
                }
            };
            let report = run_check_all(resources, mode).await?;
            match (&report.job, &report.job_id) {
                (Some(job), _) => print_job(job),
                (None, Some(id)) => println!("Check-all job {}", id),
                (None, None) => {}
            }
        }
        Command::Job => match resources.api.current_check_job().await? {
            Some(job) => print_job(&job),
            None => println!("No check-all job is running"),
        },
        Command::Stats { csv } => {
            let stats = api.stats().await?;
            match csv {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(default_stats_filename())
                    } else {
                        path
                    };
                    let rows = export_stats_csv(&stats, Some(path.as_path()))?;
                    info!("Wrote {} rows to {}", rows, path.display());
                    println!("Statistics written to {}", path.display());
                }
                None => {
                    println!(
                        "{} total, {} clean, {} blacklisted, {} pending",
                        stats.total,
                        stats.clean.to_string().green(),
                        stats.blacklisted.to_string().red(),
                        stats.pending.to_string().yellow()
                    );
                    for provider in &stats.providers {
                        println!("  {:<40} {}", provider.name, provider.count);
                    }
                    if let Some(last) = &stats.last_check_run {
                        println!("Last check run: {}", last);
                    }
                    if let Some(next) = &stats.next_check_run {
                        println!("Next check run: {}", next);
                    }
                    if let Some(interval) = &stats.check_interval {
                        println!("Check interval: {}", interval);
                    }
                    if let Some(active) = stats.active_providers {
                        println!("Active providers: {}", active);
                    }
                    for point in &stats.history {
                        println!(
                            "  {}  {} clean, {} blacklisted",
                            point.date,
                            point.clean.to_string().green(),
                            point.blacklisted.to_string().red()
                        );
                    }
                }
            }
        }
        Command::Activity { limit } => {
            let feed = api
                .activity(PageParams {
                    page: None,
                    limit: Some(limit),
                })
                .await?;
            for entry in &feed.items {
                println!(
                    "{}  {:<12} {}",
                    entry.created_at.as_deref().unwrap_or("-"),
                    entry.kind.as_deref().unwrap_or("-"),
                    entry
                        .message
                        .as_deref()
                        .or(entry.ip.as_deref())
                        .unwrap_or("")
                );
            }
        }
        Command::WebhookTest => {
            let ack = resources.api.test_webhook().await?;
            println!(
                "{} {}",
                "✓".green(),
                ack.message
                    .unwrap_or_else(|| "Test notification sent".to_string())
            );
        }
        Command::Login { .. } | Command::Logout | Command::Health => {}
    }
    Ok(())
}

async fn cmd_import(resources: &ClientResources, args: ImportArgs) -> Result<()> {
    let text = read_input(&args.file).await?;

    if args.dry_run {
        let candidates = parse_candidates(&text);
        for candidate in &candidates {
            println!(
                "{}{}",
                candidate.address,
                candidate
                    .name
                    .as_deref()
                    .map(|n| format!("  ({})", n))
                    .unwrap_or_default()
            );
        }
        println!("{} valid unique address(es) would be imported", candidates.len());
        return Ok(());
    }

    let report = run_import(resources, &text, &args.tags).await?;
    let run = &report.run;
    println!(
        "{} {} of {} address(es): {} added, {} skipped, {} errors in {:.1}s",
        if run.cancelled {
            "Cancelled after".yellow()
        } else {
            "Imported".green()
        },
        run.current_offset,
        run.total,
        run.added,
        run.skipped,
        run.errors,
        report.elapsed_seconds
    );
    Ok(())
}

async fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        info!("Reading addresses from stdin");
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read addresses from stdin")?;
        Ok(text)
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}

fn paint_status(status: IpStatus) -> ColoredString {
    match status {
        IpStatus::Clean => status.as_str().green(),
        IpStatus::Blacklisted => status.as_str().red(),
        IpStatus::Pending => status.as_str().yellow(),
        IpStatus::Unknown => status.as_str().normal(),
    }
}

fn print_record_line(record: &IpRecord) {
    println!(
        "{:<40} {:<12} {:<24} {}",
        record.ip_address,
        paint_status(record.status),
        record.name.as_deref().unwrap_or(""),
        record.tags.join(",")
    );
}

fn print_hostname_line(record: &IpRecord) {
    let network = record.network_label();
    println!(
        "{:<40} {:<32} {}",
        record.ip_address,
        network.as_deref().unwrap_or("Unknown"),
        record
            .hostname
            .as_deref()
            .map(|h| h.normal())
            .unwrap_or_else(|| "No PTR record".dimmed())
    );
}

fn print_record(record: &IpRecord) {
    println!("Address:      {}", record.ip_address);
    println!("Status:       {}", paint_status(record.status));
    if let Some(name) = &record.name {
        println!("Name:         {}", name);
    }
    if let Some(description) = &record.description {
        println!("Description:  {}", description);
    }
    if !record.tags.is_empty() {
        println!("Tags:         {}", record.tags.join(", "));
    }
    if let Some(hostname) = &record.hostname {
        println!("Hostname:     {}", hostname);
    }
    if let Some(network) = record.network_label() {
        println!("Network:      {}", network);
    }
    if let Some(org) = &record.org {
        println!("Organization: {}", org);
    }
    println!("Checks:       {}", record.check_count);
    println!("Listings:     {}", record.blacklist_count);
    for listing in &record.blacklists {
        println!("  - {}", listing.red());
    }
    if let Some(last) = &record.last_checked {
        println!("Last checked: {}", last);
    }
    if record.notifications_muted {
        println!("Notifications muted");
    }
}

fn print_check_result(result: &CheckResult) {
    println!(
        "{:<40} {:<12} {} listing(s){}",
        result.ip_address,
        paint_status(result.status),
        result.blacklist_count,
        if result.blacklists.is_empty() {
            String::new()
        } else {
            format!(": {}", result.blacklists.join(", "))
        }
    );
}

fn print_job(job: &CheckJob) {
    println!(
        "Check-all job {}: {} {:.0}% ({}/{} checked, {} clean, {} blacklisted, {} errors)",
        job.job_id,
        job.status,
        job.progress,
        job.checked,
        job.total,
        job.clean,
        job.blacklisted,
        job.errors
    );
}
