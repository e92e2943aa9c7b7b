use std::sync::OnceLock;

use regex::Regex;

use crate::model::{FormField, ProductId};
use crate::query::SortKey;
use crate::utils;

pub const HELP: &str = "\
commands:
  search [TEXT]          set the search text (empty clears it)
  category [NAME]        set the category filter (empty clears it)
  sort KEY               created_at_desc | price_asc | price_desc | name_asc | name_desc
  refresh                reload the list now
  add FIELD=VALUE ...    fill the add form and submit it
  edit ID                open the edit dialog for a product
  set FIELD=VALUE ...    change fields in the open edit dialog
  save                   submit the edit dialog
  cancel                 close the edit dialog without saving
  delete ID              delete a product (asks for confirmation)
  export FILE            write the current list as an HTML page
  help                   show this help
  quit                   exit

fields: name, category, price, stock, description
values with spaces need double quotes: add name=\"Water Bottle\" price=1200 stock=40";

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Empty,
    Search(String),
    Category(String),
    Sort(SortKey),
    Refresh,
    Add(Vec<(FormField, String)>),
    Edit(ProductId),
    Set(Vec<(FormField, String)>),
    Save,
    Cancel,
    Delete(ProductId),
    Export(String),
    Help,
    Quit,
}

fn assignment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^([A-Za-z_]+)=(.*)$").unwrap_or_else(|e| panic!("assignment regex: {e}"))
    })
}

fn parse_assignments(tokens: &[String]) -> Result<Vec<(FormField, String)>, String> {
    if tokens.is_empty() {
        return Err("expected at least one FIELD=VALUE".to_string());
    }
    tokens
        .iter()
        .map(|t| -> Result<(FormField, String), String> {
            let caps = assignment_regex()
                .captures(t)
                .ok_or_else(|| format!("expected FIELD=VALUE, got '{t}'"))?;
            let field = caps[1].parse::<FormField>()?;
            Ok((field, caps[2].to_string()))
        })
        .collect()
}

fn single_id(name: &str, tokens: &[String]) -> Result<ProductId, String> {
    match tokens {
        [id] => id.parse(),
        _ => Err(format!("usage: {name} ID")),
    }
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let tokens = utils::split_quoted(line)?;
    let Some((head, rest)) = tokens.split_first() else {
        return Ok(Command::Empty);
    };

    match head.to_ascii_lowercase().as_str() {
        "search" | "q" => Ok(Command::Search(rest.join(" "))),
        "category" | "cat" => Ok(Command::Category(rest.join(" "))),
        "sort" => match rest {
            [key] => Ok(Command::Sort(key.parse()?)),
            _ => Err("usage: sort KEY".to_string()),
        },
        "refresh" | "r" | "ls" => Ok(Command::Refresh),
        "add" => Ok(Command::Add(if rest.is_empty() {
            Vec::new()
        } else {
            parse_assignments(rest)?
        })),
        "edit" => Ok(Command::Edit(single_id("edit", rest)?)),
        "set" => Ok(Command::Set(parse_assignments(rest)?)),
        "save" => Ok(Command::Save),
        "cancel" | "close" => Ok(Command::Cancel),
        "delete" | "del" | "rm" => Ok(Command::Delete(single_id("delete", rest)?)),
        "export" => match rest {
            [path] => Ok(Command::Export(path.clone())),
            _ => Err("usage: export FILE".to_string()),
        },
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}
