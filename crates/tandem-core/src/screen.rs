use std::io::{self, Write};

use anyhow::Context as _;
use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::commands::confirm_destructive;
use crate::config::Config;
use crate::item::{Context, ItemId};
use crate::render::Renderer;
use crate::store::ToDoStore;

enum Action {
    Add(String),
    Done(ItemId),
    Edit(ItemId, String),
    Delete(ItemId),
    Switch(Context),
    Quit,
    Invalid(String),
}

/// One-screen event loop over an injected store: render, read a line, mutate,
/// re-render from the store's current snapshot.
#[instrument(skip(store, cfg, renderer))]
pub fn run(store: &mut ToDoStore, cfg: &Config, renderer: &mut Renderer) -> anyhow::Result<()> {
    info!("entering interactive screen");
    println!("Type a line to add an item; done <id>, edit <id> <text>, rm <id>, work, travel, quit.");

    render_screen(store, renderer)?;
    loop {
        prompt(store.context())?;

        let mut line = String::new();
        let read = io::stdin()
            .read_line(&mut line)
            .context("failed reading input")?;
        if read == 0 {
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match parse_action(input) {
            Action::Quit => break,
            Action::Switch(context) => store.set_context(context),
            Action::Add(text) => {
                let _ = store.add_item(&text, store.context(), Utc::now());
            }
            Action::Done(id) => {
                if !store.toggle_done(id) {
                    println!("No item {id}.");
                }
            }
            Action::Edit(id, text) => {
                if !store.edit_item(id, &text) {
                    println!("No item {id}.");
                }
            }
            Action::Delete(id) => {
                let confirmed = match store.get(id) {
                    Some(item) => confirm_destructive(cfg, &format!("Delete \"{}\"?", item.text))?,
                    None => {
                        println!("No item {id}.");
                        false
                    }
                };
                if confirmed {
                    store.delete_item(id);
                }
            }
            Action::Invalid(message) => {
                println!("{message}");
                continue;
            }
        }

        render_screen(store, renderer)?;
    }

    debug!("leaving interactive screen");
    Ok(())
}

fn render_screen(store: &ToDoStore, renderer: &mut Renderer) -> anyhow::Result<()> {
    println!();
    println!("{}", renderer.context_header(store.context()));

    let rows: Vec<_> = store.items_in(store.context()).collect();
    renderer.print_item_table(store.context(), &rows)?;
    Ok(())
}

fn prompt(context: Context) -> anyhow::Result<()> {
    print!("{} > ", context.placeholder());
    io::stdout().flush()?;
    Ok(())
}

fn parse_action(input: &str) -> Action {
    let (head, rest) = match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (input, ""),
    };

    match head {
        "quit" | "q" | "exit" => Action::Quit,
        "work" => Action::Switch(Context::Work),
        "travel" => Action::Switch(Context::Travel),
        "done" => parse_id(rest).map_or_else(Action::Invalid, Action::Done),
        "rm" | "delete" => parse_id(rest).map_or_else(Action::Invalid, Action::Delete),
        "edit" => parse_edit(rest),
        // Anything else is the text of a new item.
        _ => Action::Add(input.to_string()),
    }
}

fn parse_id(raw: &str) -> Result<ItemId, String> {
    if raw.is_empty() {
        return Err("an item id is required".to_string());
    }
    raw.parse::<ItemId>().map_err(|err| err.to_string())
}

fn parse_edit(rest: &str) -> Action {
    let Some((raw_id, text)) = rest.split_once(char::is_whitespace) else {
        return Action::Invalid("edit needs an item id and replacement text".to_string());
    };

    let text = text.trim();
    if text.is_empty() {
        return Action::Invalid("edit needs replacement text".to_string());
    }

    match parse_id(raw_id) {
        Ok(id) => Action::Edit(id, text.to_string()),
        Err(message) => Action::Invalid(message),
    }
}
