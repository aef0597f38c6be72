use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use itertools::Itertools;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

use crate::aggregate::{DataStatus, SourceStatus};
use crate::bootstrap::GridOutcome;
use crate::cli::args::{CliArgs, Command};
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::output::OutputFormat;
use crate::pages;
use crate::router::RetryPolicy;
use crate::runner::{self, DataSource, Options, Runner};
use crate::utils;

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

fn render_custom_help() -> String {
    let cmd = CliArgs::command();
    let mut out = String::new();

    out.push_str(cmd.get_name());
    if let Some(version) = cmd.get_version() {
        out.push(' ');
        out.push_str(version);
    }
    out.push('\n');

    if let Some(long_about) = cmd.get_long_about().or(cmd.get_about()) {
        out.push('\n');
        out.push_str(&long_about.to_string());
        out.push('\n');
    }

    out.push('\n');
    out.push_str("Usage: ");
    out.push_str(cmd.get_name());
    out.push_str(" [OPTIONS] <COMMAND>\n\n");

    out.push_str("Commands:\n");
    for sub in cmd.get_subcommands() {
        let about = sub.get_about().map(|a| a.to_string()).unwrap_or_default();
        out.push_str(&format!("  {:<12}{}\n", sub.get_name(), about.trim()));
    }
    out.push('\n');

    let mut sections: Vec<(String, Vec<&clap::Arg>)> = Vec::new();
    let mut section_idx: HashMap<String, usize> = HashMap::new();

    for arg in cmd.get_arguments() {
        if arg.is_hide_set() {
            continue;
        }
        let heading = arg.get_help_heading().unwrap_or("Options").to_string();
        let idx = match section_idx.get(&heading).copied() {
            Some(i) => i,
            None => {
                sections.push((heading.clone(), Vec::new()));
                let i = sections.len() - 1;
                section_idx.insert(heading, i);
                i
            }
        };
        sections[idx].1.push(arg);
    }

    for (heading, args) in sections {
        out.push_str(&heading);
        out.push_str(":\n");

        for arg in args {
            let mut parts: Vec<String> = Vec::new();
            if let Some(short) = arg.get_short() {
                parts.push(format!("-{short}"));
            }
            if let Some(long) = arg.get_long() {
                parts.push(format!("--{long}"));
            }
            if let Some(aliases) = arg.get_visible_aliases() {
                for alias in aliases {
                    let rendered = format!("--{alias}");
                    if !parts.iter().any(|p| p == &rendered) {
                        parts.push(rendered);
                    }
                }
            }

            let mut flags = parts.join(", ");
            if arg.get_action().takes_values() {
                let value_name = arg
                    .get_value_names()
                    .and_then(|names| names.first())
                    .map(|name| name.as_str())
                    .unwrap_or("VALUE");
                flags.push_str(&format!(" <{value_name}>"));
            }

            out.push_str("  ");
            out.push_str(&flags);
            out.push('\n');

            if let Some(help) = arg.get_help() {
                let help = help.to_string();
                if !help.trim().is_empty() {
                    out.push_str("          ");
                    out.push_str(help.trim());
                    out.push('\n');
                }
            }
            out.push('\n');
        }
    }

    out.push_str("Run 'statgrid <COMMAND> --help' for command options.\n");
    out
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("statgrid={level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn data_source_label(data: &DataSource) -> String {
    match data {
        DataSource::Url(url) => url.clone(),
        DataSource::Dir(dir) => dir.display().to_string(),
    }
}

fn new_progress_bar(len: u64) -> Result<ProgressBar, String> {
    let pb = ProgressBar::new(len.max(1));
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(200));
    pb.set_style(
        ProgressStyle::with_template(
            ":: Progress: [{pos}/{len}] :: Duration: [{elapsed_precise}] :: {msg}",
        )
        .map_err(|e| format!("failed to build progress bar style: {e}"))?
        .progress_chars(r#"#>-"#),
    );
    Ok(pb)
}

#[derive(Clone, Debug)]
struct RunConfig {
    command: Command,
    config_path: Option<PathBuf>,
    data: DataSource,
    timeout: usize,
    retry: RetryPolicy,
    pages: Vec<String>,
    output_dir: PathBuf,
    format: OutputFormat,
    dashboard: Option<String>,
    no_color: bool,
    verbose: u8,
}

impl RunConfig {
    fn runner_options(&self) -> Options {
        Options {
            data: self.data.clone(),
            timeout_seconds: self.timeout,
            pages: self.pages.clone(),
            format: self.format,
            retry: self.retry,
        }
    }
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };
    let verbose = if args.verbose > 0 {
        args.verbose
    } else {
        cfg.verbose.unwrap_or(0)
    };

    // A data source given on the command line replaces the configured one.
    let (data_dir, data_url) = if args.data_dir.is_some() || args.data_url.is_some() {
        (args.data_dir.clone(), args.data_url.clone())
    } else {
        (cfg.data_dir.clone(), cfg.data_url.clone())
    };
    let data = match (data_dir, data_url) {
        (Some(dir), _) => DataSource::Dir(config::expand_tilde(&dir)),
        (None, Some(url)) => {
            reqwest::Url::parse(&url).map_err(|e| format!("invalid data_url '{url}': {e}"))?;
            DataSource::Url(url)
        }
        (None, None) => DataSource::Dir(PathBuf::from(".")),
    };

    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    if timeout == 0 {
        return Err("invalid timeout, expected positive integer".to_string());
    }

    let defaults = RetryPolicy::default();
    let retry = RetryPolicy {
        max_attempts: args
            .retry_attempts
            .or(cfg.retry_max_attempts)
            .unwrap_or(defaults.max_attempts),
        initial_delay: cfg
            .retry_initial_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.initial_delay),
        max_delay: cfg
            .retry_max_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.max_delay),
        multiplier: defaults.multiplier,
    };
    if retry.max_attempts == 0 {
        return Err("invalid retry_max_attempts, expected positive integer".to_string());
    }

    let (cli_pages, out, cli_format, dashboard) = match &args.command {
        Command::Check { pages } => (pages.clone(), None, None, None),
        Command::Build {
            pages,
            out,
            format,
        } => (pages.clone(), out.clone(), format.clone(), None),
        Command::Route { dashboard, .. } => (Vec::new(), None, None, dashboard.clone()),
        Command::Pages | Command::InitConfig => (Vec::new(), None, None, None),
    };

    let mut pages: Vec<String> = Vec::new();
    for raw in cli_pages.iter() {
        pages.extend(utils::parse_csv_list(raw)?);
    }
    if pages.is_empty() && matches!(args.command, Command::Check { .. } | Command::Build { .. }) {
        pages = cfg.pages.clone().unwrap_or_default();
    }
    for id in pages.iter() {
        if pages::find(id).is_none() {
            return Err(format!("unknown page '{id}' (run 'statgrid pages' to list them)"));
        }
    }

    let format_raw = cli_format
        .or(cfg.format.clone())
        .unwrap_or_else(|| "html".to_string());
    let format = OutputFormat::parse(&format_raw)
        .ok_or_else(|| format!("invalid format '{format_raw}', expected html or json"))?;

    let output_dir = config::expand_tilde(
        &out.or(cfg.output_dir.clone())
            .unwrap_or_else(|| "./dist".to_string()),
    );
    let dashboard = dashboard
        .or(cfg.dashboard.clone())
        .map(|p| config::expand_tilde(&p).to_string_lossy().to_string());

    let config_path = args
        .config
        .as_deref()
        .map(config::expand_tilde)
        .or_else(config::default_config_path);

    Ok(RunConfig {
        command: args.command,
        config_path,
        data,
        timeout,
        retry,
        pages,
        output_dir,
        format,
        dashboard,
        no_color,
        verbose,
    })
}

fn print_pages() {
    let catalog = pages::catalog();
    format_kv_line("Pages", &catalog.len().to_string());
    println!();
    for page in catalog.iter() {
        let mounts = page.mount_ids().join(", ");
        println!(
            "{:<28} {:<40} [{}] {} resources",
            page.id.bold(),
            page.title,
            mounts.cyan(),
            page.resources().count()
        );
    }
    let teams = pages::implemented_teams();
    println!();
    format_kv_line("Teams", &teams.join(", "));
}

fn source_tag(status: &SourceStatus) -> String {
    match status {
        SourceStatus::Loaded(rows) => format!("{} {rows} rows", "[OK]".green().bold()),
        SourceStatus::Empty => format!("{}", "[EMPTY]".yellow().bold()),
        SourceStatus::Failed(reason) => format!("{} {reason}", "[FAIL]".red().bold()),
    }
}

fn data_status_tag(status: DataStatus) -> colored::ColoredString {
    match status {
        DataStatus::Populated => "populated".green(),
        DataStatus::Empty => "empty".yellow(),
        DataStatus::Failed => "failed".red(),
    }
}

async fn run_check(runner: &Runner) -> Result<(), String> {
    let pb = new_progress_bar(runner.grid_count() as u64)?;
    let checks = runner.check(&pb).await;
    pb.finish_and_clear();

    let mut failures = 0usize;
    for page in checks.iter() {
        println!("{}", page.page_id.bold());
        for grid in page.grids.iter() {
            let agg = &grid.aggregate;
            println!(
                "  #{} {} rows ({})",
                grid.mount_id,
                agg.rows.len(),
                data_status_tag(agg.status())
            );
            for source in agg.sources.iter() {
                if matches!(source.status, SourceStatus::Failed(_)) {
                    failures += 1;
                }
                println!("    {:<40} {}", source.resource, source_tag(&source.status));
            }
        }
    }
    println!();
    if failures > 0 {
        return Err(format!("{failures} resource(s) failed to load"));
    }
    format_kv_line("Check", &"all resources loaded".green().to_string());
    Ok(())
}

async fn run_build(runner: &Runner, run: &RunConfig) -> Result<(), String> {
    format_kv_line("Output", &run.output_dir.display().to_string());
    format_kv_line(
        "Format",
        match run.format {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
        },
    );
    println!();

    let now = Instant::now();
    let pb = new_progress_bar(runner.grid_count() as u64)?;
    let built = runner.build(&pb).await;
    pb.finish_and_clear();

    let written = runner::write_pages(&built, &run.output_dir)
        .await
        .map_err(|e| e.to_string())?;

    let mut incomplete = 0usize;
    for (page, path) in built.iter().zip(written.iter()) {
        let total = page.report.grids.len();
        let mounted = page.report.mounted();
        let tag = if page.report.is_complete() {
            "[OK]".green().bold()
        } else {
            incomplete += 1;
            "[PARTIAL]".yellow().bold()
        };
        println!(
            "{} {:<28} {mounted}/{total} grids -> {}",
            tag,
            page.page.id,
            path.display()
        );
        for outcome in page.report.grids.iter().filter(|g| !g.is_mounted()) {
            let reason = match outcome {
                GridOutcome::NoData { status, .. } => format!("no data ({})", data_status_tag(*status)),
                GridOutcome::MissingMount { .. } => "mount element missing".to_string(),
                GridOutcome::Failed { reason, .. } => reason.clone(),
                GridOutcome::Mounted { .. } => continue,
            };
            println!("      #{} {}", outcome.mount_id(), reason.red());
        }
    }
    println!();
    format_kv_line("Pages", &format!("{} written", written.len()));
    if incomplete > 0 {
        format_kv_line("Partial", &incomplete.to_string());
    }
    format_kv_line("Elapsed", &format!("{:.2?}", now.elapsed()));
    Ok(())
}

async fn run_route(
    runner: &Runner,
    run: &RunConfig,
    hash: &str,
    whole_document: bool,
) -> Result<(), String> {
    let markup = runner::load_dashboard(run.dashboard.as_deref())
        .await
        .map_err(|e| e.to_string())?;
    let outcome = runner.route(&markup, hash).await;

    format_kv_line("View", &outcome.state.to_string());
    if let Some(code) = outcome.state.team_code() {
        format_kv_line("Team", &code.to_ascii_uppercase());
    }
    if let Some(report) = outcome.report.as_ref() {
        format_kv_line(
            "Grids",
            &format!("{}/{} mounted", report.mounted(), report.grids.len()),
        );
    }
    println!();
    if whole_document {
        println!("{}", outcome.document);
    } else {
        println!("{}", outcome.content);
    }
    Ok(())
}

fn run_init_config(run: &RunConfig) -> Result<(), String> {
    let path = run
        .config_path
        .as_ref()
        .ok_or_else(|| "could not determine config path (HOME not set)".to_string())?;
    if config::ensure_default_config_file(path)? {
        format_kv_line("Config", &format!("written to {}", path.display()));
    } else {
        format_kv_line("Config", &format!("already exists at {}", path.display()));
    }
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    match &run.command {
        Command::Pages => {
            print_pages();
            Ok(())
        }
        Command::InitConfig => run_init_config(&run),
        command => {
            format_kv_line("Data", &data_source_label(&run.data));
            let runner = Runner::new(run.runner_options()).map_err(|e| e.to_string())?;
            match command {
                Command::Check { .. } => run_check(&runner).await,
                Command::Build { .. } => run_build(&runner, &run).await,
                Command::Route { hash, document, .. } => {
                    run_route(&runner, &run, hash, *document).await
                }
                Command::Pages | Command::InitConfig => Ok(()),
            }
        }
    }
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                if std::env::args().count() > 2 {
                    print!("{e}");
                } else {
                    print!("{}", render_custom_help());
                }
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let cfg = match args.config.as_ref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;
    init_logging(run.verbose);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))?;
    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn cli_flags_override_config() {
        let args = CliArgs::parse_from(["statgrid", "-T", "3", "build", "--format", "json"]);
        let cfg = ConfigFile {
            timeout: Some(30),
            format: Some("html".to_string()),
            output_dir: Some("./site-out".to_string()),
            ..ConfigFile::default()
        };
        let run = build_run_config(args, cfg).unwrap();
        assert_eq!(run.timeout, 3);
        assert_eq!(run.format, OutputFormat::Json);
        assert_eq!(run.output_dir, PathBuf::from("./site-out"));
    }

    #[test]
    fn defaults_apply_without_config() {
        let args = CliArgs::parse_from(["statgrid", "check"]);
        let run = build_run_config(args, ConfigFile::default()).unwrap();
        assert_eq!(run.timeout, 10);
        assert_eq!(run.retry, RetryPolicy::default());
        assert_eq!(run.data, DataSource::Dir(PathBuf::from(".")));
        assert!(run.pages.is_empty());
        assert_eq!(run.output_dir, PathBuf::from("./dist"));
    }

    #[test]
    fn cli_data_url_replaces_configured_dir() {
        let args = CliArgs::parse_from(["statgrid", "--data-url", "https://stats.example.com/", "check"]);
        let cfg = ConfigFile {
            data_dir: Some(".".to_string()),
            ..ConfigFile::default()
        };
        let run = build_run_config(args, cfg).unwrap();
        assert_eq!(
            run.data,
            DataSource::Url("https://stats.example.com/".to_string())
        );
    }

    #[test]
    fn page_lists_are_split_and_checked() {
        let args = CliArgs::parse_from([
            "statgrid",
            "build",
            "--page",
            "nhl/team/tor/gamelog,nhl/team/tor/roster",
        ]);
        let run = build_run_config(args, ConfigFile::default()).unwrap();
        assert_eq!(run.pages.len(), 2);

        let args = CliArgs::parse_from(["statgrid", "check", "-p", "nhl/team/xxx/gamelog"]);
        let err = build_run_config(args, ConfigFile::default()).unwrap_err();
        assert!(err.contains("unknown page"));
    }

    #[test]
    fn configured_pages_used_when_none_given() {
        let args = CliArgs::parse_from(["statgrid", "build"]);
        let cfg = ConfigFile {
            pages: Some(vec!["nhl/player/mitch/splits".to_string()]),
            retry_max_attempts: Some(5),
            ..ConfigFile::default()
        };
        let run = build_run_config(args, cfg).unwrap();
        assert_eq!(run.pages, vec!["nhl/player/mitch/splits".to_string()]);
        assert_eq!(run.retry.max_attempts, 5);
    }

    #[test]
    fn help_lists_subcommands() {
        let help = render_custom_help();
        assert!(help.contains("build"));
        assert!(help.contains("--data-url"));
    }
}
