use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "statgrid",
    version,
    about = "static sports-stat grid pages",
    long_about = "Statgrid loads JSON stat files, merges them per grid and mounts them into AG Grid pages.\n\nExamples:\n  statgrid pages\n  statgrid --data-dir ./site check --page nhl/team/tor/gamelog\n  statgrid --data-url https://stats.example.com/ build --out ./dist\n  statgrid route '#/NHL/team/TOR' --dashboard ./index.html\n\nTip: Use --config to persist data source and output settings."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true,
        help_heading = "Output",
        help = "Increase log verbosity (-v info, -vv debug). RUST_LOG overrides."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "color",
        global = true,
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        short = 'n',
        long = "no-color",
        visible_alias = "nc",
        global = true,
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'C',
        long = "config",
        visible_alias = "cfg",
        value_name = "FILE",
        global = true,
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.statgrid/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        short = 'u',
        long = "data-url",
        visible_alias = "url",
        value_name = "URL",
        global = true,
        help_heading = "Input",
        help = "Base URL the data files are fetched from."
    )]
    pub data_url: Option<String>,

    #[arg(
        short = 'd',
        long = "data-dir",
        visible_alias = "dir",
        value_name = "DIR",
        global = true,
        help_heading = "Input",
        help = "Directory mirroring the site root; data files are read from it (default: .)."
    )]
    pub data_dir: Option<String>,

    #[arg(
        short = 'T',
        long = "timeout",
        visible_alias = "to",
        value_name = "SECONDS",
        global = true,
        help_heading = "HTTP",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<usize>,

    #[arg(
        long = "retry-attempts",
        value_name = "N",
        global = true,
        help_heading = "Router",
        help = "Grid library readiness checks before giving up."
    )]
    pub retry_attempts: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the page catalog.
    Pages,

    /// Load every resource of the selected pages and report per-source outcomes.
    Check {
        #[arg(
            short = 'p',
            long = "page",
            value_name = "ID",
            action = ArgAction::Append,
            help = "Page id to check (repeatable or comma-separated; default: all)."
        )]
        pages: Vec<String>,
    },

    /// Bootstrap the selected pages and write one file per page.
    Build {
        #[arg(
            short = 'p',
            long = "page",
            value_name = "ID",
            action = ArgAction::Append,
            help = "Page id to build (repeatable or comma-separated; default: all)."
        )]
        pages: Vec<String>,

        #[arg(
            short = 'o',
            long = "out",
            visible_alias = "output",
            value_name = "DIR",
            help = "Output directory (default: ./dist)."
        )]
        out: Option<String>,

        #[arg(
            short = 'A',
            long = "format",
            visible_alias = "output-format",
            value_name = "FORMAT",
            help = "Output format (html or json)."
        )]
        format: Option<String>,
    },

    /// Run the hash router against a dashboard document and print the routed markup.
    Route {
        #[arg(value_name = "HASH", help = "Hash fragment to navigate to (e.g. '#/NHL/team/TOR').")]
        hash: String,

        #[arg(
            short = 'D',
            long = "dashboard",
            value_name = "FILE",
            help = "Dashboard HTML file. Links are rewritten across the whole file; the element with id=\"content\" is the routed region, or the whole file when there is none (default: built-in dashboard)."
        )]
        dashboard: Option<String>,

        #[arg(
            long = "document",
            help = "Print the whole dashboard document instead of only the content region."
        )]
        document: bool,
    },

    /// Write the default config file if it does not exist.
    InitConfig,
}
