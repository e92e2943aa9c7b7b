use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "catalog-admin",
    version,
    about = "admin console for a product catalog REST API",
    long_about = "catalog-admin lists, searches, filters, sorts, creates, edits and deletes products through the catalog REST API.\n\nExamples:\n  catalog-admin -u http://127.0.0.1:5000\n  catalog-admin -u http://127.0.0.1:5000 --list -q laptop -s price_asc\n  catalog-admin --config ~/.catalog-admin/config.yml --export catalog.html\n\nTip: Use --config to persist the API URL and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv, -vvv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'n',
        long = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'u',
        long = "url",
        value_name = "URL",
        help_heading = "API",
        help = "Base URL of the catalog API (e.g. http://127.0.0.1:5000)."
    )]
    pub url: Option<String>,

    #[arg(
        short = 'T',
        long = "timeout",
        value_name = "SECONDS",
        help_heading = "API",
        help = "Per-request timeout in seconds (0 = none)."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.catalog-admin/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        short = 'q',
        long = "search",
        value_name = "TEXT",
        help_heading = "List",
        help = "Initial search text (matches name, description and category)."
    )]
    pub search: Option<String>,

    #[arg(
        long = "category",
        value_name = "NAME",
        help_heading = "List",
        help = "Initial category filter (exact match)."
    )]
    pub category: Option<String>,

    #[arg(
        short = 's',
        long = "sort",
        value_name = "KEY",
        help_heading = "List",
        help = "Initial sort: created_at_desc, price_asc, price_desc, name_asc, name_desc."
    )]
    pub sort: Option<String>,

    #[arg(
        long = "debounce",
        value_name = "MS",
        help_heading = "List",
        help = "Quiet period in milliseconds before search/filter/sort changes refresh the list."
    )]
    pub debounce: Option<u64>,

    #[arg(
        long = "list",
        help_heading = "Mode",
        help = "Print the list once and exit."
    )]
    pub list: bool,

    #[arg(
        short = 'o',
        long = "export",
        value_name = "FILE",
        help_heading = "Mode",
        help = "Write the list as an HTML page and exit."
    )]
    pub export: Option<String>,
}
