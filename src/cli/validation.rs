use crate::cli::args::{CliArgs, Command};
use crate::output::OutputFormat;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive integer".to_string());
        }
    }
    if let Some(attempts) = args.retry_attempts {
        if attempts == 0 {
            return Err("invalid retry-attempts, expected positive integer".to_string());
        }
    }
    if let Some(raw) = args.data_url.as_deref() {
        reqwest::Url::parse(raw).map_err(|e| format!("invalid --data-url '{raw}': {e}"))?;
    }
    if args.data_dir.as_deref().is_some_and(|d| d.trim().is_empty()) {
        return Err("invalid --data-dir, expected a directory".to_string());
    }
    match &args.command {
        Command::Check { pages } | Command::Build { pages, .. } => {
            for raw in pages.iter() {
                crate::utils::parse_csv_list(raw)
                    .map_err(|e| format!("invalid --page '{raw}': {e}"))?;
            }
        }
        Command::Route { hash, .. } if hash.contains(char::is_whitespace) => {
            return Err(format!("invalid hash '{hash}', whitespace is not allowed"));
        }
        _ => {}
    }
    if let Command::Build {
        format: Some(raw), ..
    } = &args.command
    {
        OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid --format '{raw}', expected html or json"))?;
    }
    Ok(())
}
