use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::item::{Context, Item, ItemId};

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    #[tracing::instrument(skip(self, items))]
    pub fn print_item_table(
        &mut self,
        context: Context,
        items: &[(ItemId, &Item)],
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        if items.is_empty() {
            writeln!(out, "{}", context.placeholder())?;
            return Ok(());
        }

        let headers = ["ID", "", "Description"];
        let mut rows = Vec::with_capacity(items.len());

        for (id, item) in items {
            let id_cell = self.paint(&id.to_string(), "33");
            let box_cell = if item.done { "[x]" } else { "[ ]" }.to_string();
            // Done items get the struck-through, greyed treatment.
            let text_cell = if item.done {
                self.paint(&item.text, "9;2")
            } else {
                item.text.clone()
            };

            rows.push(vec![id_cell, box_cell, text_cell]);
        }

        write_table(&mut out, &headers, &rows)?;
        Ok(())
    }

    pub fn context_header(&self, active: Context) -> String {
        let work = self.header_label("Work", active == Context::Work);
        let travel = self.header_label("Travel", active == Context::Travel);
        format!("{work}  {travel}")
    }

    fn header_label(&self, label: &str, active: bool) -> String {
        if active {
            self.paint(label, "1")
        } else {
            self.paint(label, "2")
        }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(mut writer: W, headers: &[&str], rows: &[Vec<String>]) -> anyhow::Result<()> {
    let mut widths: Vec<usize> = headers
        .iter()
        .map(|header| UnicodeWidthStr::width(*header))
        .collect();

    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(visible_width(cell));
        }
    }

    for (width, header) in widths.iter().copied().zip(headers) {
        write!(writer, "{header:<width$} ")?;
    }
    writeln!(writer)?;

    for width in widths.iter().copied() {
        write!(writer, "{:-<width$} ", "")?;
    }
    writeln!(writer)?;

    for row in rows {
        for (width, cell) in widths.iter().copied().zip(row) {
            let padding = width.saturating_sub(visible_width(cell));
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn visible_width(cell: &str) -> usize {
    UnicodeWidthStr::width(strip_ansi(cell).as_str())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
