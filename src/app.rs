use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::api::{CatalogApi, HttpCatalog};
use crate::cli::args::CliArgs;
use crate::cli::command::{self, Command};
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::console::{self, Console, Options};
use crate::flows::Confirm;
use crate::query::{QueryInputs, SortKey};
use crate::view::{TerminalView, View};

const DEFAULT_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_TIMEOUT: u64 = 10;

fn print_banner() {
    println!(
        ":: {} v{} :: type 'help' for commands",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

fn notice(message: &str) {
    println!("{}", message.dimmed());
}

fn complain(message: &str) {
    println!("{}", message.red());
}

#[derive(Clone, Debug, PartialEq)]
enum Mode {
    Interactive,
    List,
    Export(PathBuf),
}

#[derive(Clone, Debug)]
struct RunConfig {
    url: String,
    timeout: u64,
    debounce: Duration,
    inputs: QueryInputs,
    no_color: bool,
    verbose: u8,
    mode: Mode,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let url = args
        .url
        .or(cfg.url)
        .unwrap_or_else(|| DEFAULT_URL.to_string());
    let timeout = args.timeout.or(cfg.timeout).unwrap_or(DEFAULT_TIMEOUT);
    let debounce = args
        .debounce
        .or(cfg.debounce)
        .map(Duration::from_millis)
        .unwrap_or(console::DEFAULT_DEBOUNCE);

    let sort_raw = args.sort.or(cfg.sort).unwrap_or_default();
    let sort: SortKey = sort_raw
        .parse()
        .map_err(|e| format!("invalid sort '{sort_raw}': {e}"))?;
    let inputs = QueryInputs {
        search: args.search.or(cfg.search).unwrap_or_default(),
        category: args.category.or(cfg.category).unwrap_or_default(),
        sort,
    };

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);
    let verbose = if args.verbose > 0 {
        args.verbose
    } else {
        cfg.verbose.unwrap_or(0)
    };

    let mode = match (args.list, args.export) {
        (_, Some(path)) => Mode::Export(config::expand_tilde(&path)),
        (true, None) => Mode::List,
        (false, None) => Mode::Interactive,
    };

    Ok(RunConfig {
        url,
        timeout,
        debounce,
        inputs,
        no_color,
        verbose,
        mode,
    })
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("catalog_admin={level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Answers confirmation prompts from the next input line.
struct LineConfirm<'a, R> {
    lines: &'a mut Lines<R>,
}

#[async_trait]
impl<'a, R> Confirm for LineConfirm<'a, R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn confirm(&mut self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        let _ = std::io::stdout().flush();
        match self.lines.next_line().await {
            Ok(Some(answer)) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            _ => false,
        }
    }
}

/// Runs one command; returns false when the session should end.
async fn dispatch<A, V, R>(
    console: &Console<A, V>,
    cmd: Command,
    lines: &mut Lines<R>,
) -> bool
where
    A: CatalogApi,
    V: View,
    R: AsyncBufRead + Unpin + Send,
{
    match cmd {
        Command::Empty => {}
        Command::Search(text) => console.set_search(text).await,
        Command::Category(name) => console.set_category(name).await,
        Command::Sort(key) => console.set_sort(key).await,
        Command::Refresh => {
            let _ = console.refresh().await;
        }
        Command::Add(fields) => {
            let outcome = console.add(fields).await;
            debug!(?outcome, "add submitted");
        }
        Command::Edit(id) => {
            let outcome = console.edit(&id).await;
            debug!(?outcome, "edit requested");
        }
        Command::Set(fields) => {
            if !console.set(fields).await {
                complain("no product is being edited, use 'edit ID' first");
            }
        }
        Command::Save => match console.save().await {
            Some(outcome) => debug!(?outcome, "edit submitted"),
            None => complain("no product is being edited, use 'edit ID' first"),
        },
        Command::Cancel => {
            if !console.cancel().await {
                notice("no product is being edited");
            }
        }
        Command::Delete(id) => {
            let outcome = console.delete(&id, &mut LineConfirm { lines }).await;
            debug!(?outcome, "delete requested");
        }
        Command::Export(path) => {
            let path = config::expand_tilde(&path);
            match console.export_html(&path).await {
                Ok(rows) => notice(&format!("wrote {rows} products to {}", path.display())),
                Err(e) => complain(&e.to_string()),
            }
        }
        Command::Help => println!("{}", command::HELP),
        Command::Quit => return false,
    }
    true
}

/// Fetches and prints the list once. A failed load is returned to the
/// caller instead of being shown, so it is reported a single time.
async fn list_once<A: CatalogApi, V: View>(console: &Console<A, V>) -> Result<usize, String> {
    let list = console
        .snapshot()
        .await
        .map_err(|e| format!("failed to load products: {e}"))?;
    console.view().lock().await.render_list(&list);
    Ok(list.table.rows.len())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    let api = HttpCatalog::new(&run.url, run.timeout).map_err(|e| e.to_string())?;
    let options = Options {
        debounce: run.debounce,
        inputs: run.inputs.clone(),
    };
    let console = Console::new(api, TerminalView::stdout(), options);

    match run.mode {
        Mode::List => {
            list_once(&console).await?;
            return Ok(());
        }
        Mode::Export(path) => {
            let rows = console
                .export_html(&path)
                .await
                .map_err(|e| e.to_string())?;
            println!("wrote {rows} products to {}", path.display());
            return Ok(());
        }
        Mode::Interactive => {}
    }

    print_banner();
    format_kv_line("API", &run.url);
    format_kv_line("Timeout", &format!("{}s", run.timeout));
    format_kv_line("Debounce", &format!("{}ms", console.debounce().as_millis()));
    format_kv_line("Sort", console.coordinator().inputs().await.sort.label());

    // a failed first load is already on screen; the session continues
    let _ = console.start().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => return Err(format!("failed to read input: {e}")),
        };
        match command::parse_command(&line) {
            Ok(cmd) => {
                if !dispatch(&console, cmd, &mut lines).await {
                    break;
                }
            }
            Err(e) => complain(&e),
        }
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                let mut cmd = CliArgs::command();
                print!("{}", cmd.render_long_help());
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

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => {
                config::ensure_default_config_file(&path)?;
                config::load_config(&path, true)?
            }
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;
    init_logging(run.verbose);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
