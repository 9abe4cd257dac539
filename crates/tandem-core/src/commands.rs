use std::io::{self, Write};

use anyhow::anyhow;
use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::cli::Invocation;
use crate::config::Config;
use crate::item::{Context, ItemId};
use crate::render::Renderer;
use crate::screen;
use crate::store::ToDoStore;

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "add", "list", "done", "edit", "delete", "work", "travel", "context", "ui", "help",
        "version",
    ]
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[instrument(skip(store, cfg, renderer, inv))]
pub fn dispatch(
    store: &mut ToDoStore,
    cfg: &Config,
    renderer: &mut Renderer,
    inv: Invocation,
) -> anyhow::Result<()> {
    let now = Utc::now();
    let command = inv.command.as_str();
    debug!(command, args = ?inv.args, "dispatching command");

    match command {
        "add" => cmd_add(store, &inv.args, now),
        "list" => cmd_list(store, renderer, &inv.args),
        "done" => cmd_done(store, &inv.args),
        "edit" => cmd_edit(store, &inv.args),
        "delete" => cmd_delete(store, cfg, &inv.args),
        "work" => cmd_switch(store, Context::Work),
        "travel" => cmd_switch(store, Context::Travel),
        "context" => cmd_context(store, &inv.args),
        "ui" => screen::run(store, cfg, renderer),
        "help" => cmd_help(),
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => Err(anyhow!("unknown command: {other}")),
    }
}

#[instrument(skip(store, args, now))]
fn cmd_add(store: &mut ToDoStore, args: &[String], now: chrono::DateTime<Utc>) -> anyhow::Result<()> {
    info!("command add");

    let text = args.join(" ");
    match store.add_item(&text, store.context(), now) {
        Some(id) => println!("Created item {id}."),
        None => println!("Nothing to add."),
    }
    Ok(())
}

#[instrument(skip(store, renderer, args))]
fn cmd_list(store: &mut ToDoStore, renderer: &mut Renderer, args: &[String]) -> anyhow::Result<()> {
    info!("command list");

    let context = match args.first() {
        Some(arg) => arg.parse::<Context>()?,
        None => store.context(),
    };

    let rows: Vec<_> = store.items_in(context).collect();
    renderer.print_item_table(context, &rows)?;
    Ok(())
}

#[instrument(skip(store, args))]
fn cmd_done(store: &mut ToDoStore, args: &[String]) -> anyhow::Result<()> {
    info!("command done");

    let id = parse_id_arg(args, "done requires an item id")?;
    if !store.toggle_done(id) {
        println!("No item {id}.");
        return Ok(());
    }

    let done = store.get(id).map(|item| item.done).unwrap_or(false);
    println!(
        "Item {id} is now {}.",
        if done { "done" } else { "pending" }
    );
    Ok(())
}

#[instrument(skip(store, args))]
fn cmd_edit(store: &mut ToDoStore, args: &[String]) -> anyhow::Result<()> {
    info!("command edit");

    if args.len() < 2 {
        return Err(anyhow!("edit requires an item id and replacement text"));
    }

    let id = args[0].parse::<ItemId>()?;
    let text = args[1..].join(" ");
    if store.edit_item(id, &text) {
        println!("Edited item {id}.");
    } else {
        println!("Nothing changed.");
    }
    Ok(())
}

#[instrument(skip(store, cfg, args))]
fn cmd_delete(store: &mut ToDoStore, cfg: &Config, args: &[String]) -> anyhow::Result<()> {
    info!("command delete");

    let id = parse_id_arg(args, "delete requires an item id")?;
    let Some(item) = store.get(id) else {
        println!("No item {id}.");
        return Ok(());
    };

    if !confirm_destructive(cfg, &format!("Delete \"{}\"?", item.text))? {
        println!("Cancelled.");
        return Ok(());
    }

    store.delete_item(id);
    println!("Deleted item {id}.");
    Ok(())
}

#[instrument(skip(store))]
fn cmd_switch(store: &mut ToDoStore, context: Context) -> anyhow::Result<()> {
    info!(%context, "command context switch");

    store.set_context(context);
    println!("Context set: {context}");
    Ok(())
}

#[instrument(skip(store, args))]
fn cmd_context(store: &mut ToDoStore, args: &[String]) -> anyhow::Result<()> {
    match args.first() {
        None => {
            println!("active={}", store.context());
            Ok(())
        }
        Some(raw) => cmd_switch(store, raw.parse()?),
    }
}

fn cmd_help() -> anyhow::Result<()> {
    println!(
        "Implemented commands: add, list [work|travel], done <id>, edit <id> <text>, delete <id>, work, travel, context [work|travel], ui"
    );
    Ok(())
}

fn parse_id_arg(args: &[String], usage: &str) -> anyhow::Result<ItemId> {
    let raw = args.first().ok_or_else(|| anyhow!("{usage}"))?;
    raw.parse::<ItemId>()
}

// Cancel is the default: only an explicit yes confirms, everything else
// (including EOF on a non-interactive stdin) cancels.
pub(crate) fn confirm_destructive(cfg: &Config, question: &str) -> anyhow::Result<bool> {
    if !cfg.get_bool("confirmation").unwrap_or(true) {
        debug!("confirmation disabled; proceeding");
        return Ok(true);
    }

    print!("{question} [y/N] ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
