use std::io::Write;

use colored::Colorize;

use crate::model::{ProductForm, ProductId};
use crate::output::ListView;

/// Presentation seam. Flows and the coordinator only talk to the screen
/// through this trait.
pub trait View: Send + 'static {
    /// Replaces the displayed table.
    fn render_list(&mut self, list: &ListView);

    /// Reports a failure that is not tied to one form.
    fn show_error(&mut self, message: &str);

    /// Sets the message next to the add form; empty clears it.
    fn show_add_message(&mut self, message: &str);

    fn reset_add_form(&mut self);

    /// Shows the edit dialog populated with `form`.
    fn open_edit_dialog(&mut self, id: &ProductId, form: &ProductForm);

    fn show_edit_message(&mut self, message: &str);

    fn close_edit_dialog(&mut self);
}

const DESCRIPTION_WIDTH: usize = 40;

/// Draws everything as text on a writer (stdout for the console binary).
pub struct TerminalView<W> {
    out: W,
}

impl TerminalView<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send + 'static> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        // a closed stdout leaves nothing to report to
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn pad(value: &str, width: usize, right_align: bool) -> String {
    let len = value.chars().count();
    let fill = " ".repeat(width.saturating_sub(len));
    if right_align {
        format!("{fill}{value}")
    } else {
        format!("{value}{fill}")
    }
}

/// Plain-text table for `list`; no colors, one line per row plus header.
pub fn format_table(list: &ListView) -> Vec<String> {
    let headers = ["ID", "Name", "Category", "Price", "Stock", "Description"];
    let right = [true, false, false, true, true, false];
    let cells: Vec<[String; 6]> = list
        .table
        .rows
        .iter()
        .map(|r| {
            [
                r.id.to_string(),
                r.name.clone(),
                r.category.clone(),
                r.price.clone(),
                r.stock_quantity.to_string(),
                truncate(&r.description, DESCRIPTION_WIDTH),
            ]
        })
        .collect();

    let mut widths = headers.map(|h| h.chars().count());
    for row in cells.iter() {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let join = |row: [&str; 6]| {
        row.iter()
            .enumerate()
            .map(|(i, c)| pad(c, widths[i], right[i]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![join(headers)];
    for row in cells.iter() {
        out.push(join([
            row[0].as_str(),
            row[1].as_str(),
            row[2].as_str(),
            row[3].as_str(),
            row[4].as_str(),
            row[5].as_str(),
        ]));
    }
    out
}

impl<W: Write + Send + 'static> View for TerminalView<W> {
    fn render_list(&mut self, list: &ListView) {
        self.line("");
        self.line(&format!(":: {}", list.summary()).bold().to_string());
        if list.table.empty_state_visible {
            self.line(&"No products found.".dimmed().to_string());
            return;
        }
        let mut lines = format_table(list).into_iter();
        if let Some(header) = lines.next() {
            self.line(&header.bold().white().to_string());
        }
        for l in lines {
            self.line(&l);
        }
    }

    fn show_error(&mut self, message: &str) {
        self.line(&format!("error: {message}").red().to_string());
    }

    fn show_add_message(&mut self, message: &str) {
        if message.is_empty() {
            return;
        }
        self.line(&format!("[add] {message}").yellow().to_string());
    }

    fn reset_add_form(&mut self) {}

    fn open_edit_dialog(&mut self, id: &ProductId, form: &ProductForm) {
        self.line("");
        self.line(&format!("── editing product {id} ──").bold().blue().to_string());
        for (label, value) in [
            ("name", &form.name),
            ("category", &form.category),
            ("price", &form.price),
            ("stock", &form.stock),
            ("description", &form.description),
        ] {
            self.line(&format!("  {:<12}: {}", label, value));
        }
        self.line(&"  (set field=value ..., save, cancel)".dimmed().to_string());
    }

    fn show_edit_message(&mut self, message: &str) {
        if message.is_empty() {
            return;
        }
        self.line(&format!("[edit] {message}").yellow().to_string());
    }

    fn close_edit_dialog(&mut self) {
        self.line(&"── edit dialog closed ──".dimmed().to_string());
    }
}
