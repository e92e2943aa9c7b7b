use crate::cli::args::CliArgs;
use crate::query::SortKey;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.sort.as_deref() {
        raw.parse::<SortKey>()
            .map_err(|e| format!("invalid --sort '{raw}': {e}"))?;
    }
    if let Some(url) = args.url.as_deref() {
        if url.trim().is_empty() {
            return Err("invalid --url, expected a non-empty URL".to_string());
        }
    }
    if let Some(ms) = args.debounce {
        if ms > 60_000 {
            return Err(format!("invalid --debounce {ms}, expected at most 60000"));
        }
    }
    if args.list && args.export.is_some() {
        return Err("use either --list or --export, not both".to_string());
    }
    Ok(())
}
