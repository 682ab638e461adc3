//! Command dispatch

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::services::ItemService;
use crate::application::{flatten_rows, ApplicationError, FlattenMode};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{ChainEnd, ItemId, TreeItem, TreeStore};
use crate::infrastructure::traits::RealFileSystem;
use crate::infrastructure::InfraError;
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let cwd = std::env::current_dir().ok();
    let settings = Settings::load(cwd.as_deref())?;
    debug!("settings: {:?}", settings);

    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see --help".to_string(),
        ));
    };

    match command {
        Commands::Tree => cmd_tree(cli, &settings),
        Commands::Get { id } => cmd_get(cli, &settings, id),
        Commands::Children { id } => cmd_children(cli, &settings, id.as_deref()),
        Commands::Descendants { id } => cmd_descendants(cli, &settings, id),
        Commands::Ancestors { id } => cmd_ancestors(cli, &settings, id),
        Commands::Rows { visible } => cmd_rows(cli, &settings, *visible),
        Commands::Check => cmd_check(cli, &settings),
        Commands::Config { command } => cmd_config(command, &settings, cwd.as_deref()),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

fn items_path(cli: &Cli, settings: &Settings) -> PathBuf {
    cli.file
        .clone()
        .unwrap_or_else(|| settings.items_file.clone())
}

fn load_store(cli: &Cli, settings: &Settings) -> CliResult<TreeStore> {
    let service = ItemService::new(Arc::new(RealFileSystem));
    Ok(service.load(&items_path(cli, settings))?)
}

/// Parse an id argument; numeric tokens are integer ids.
pub fn parse_id(token: &str) -> CliResult<ItemId> {
    if token.is_empty() {
        return Err(CliError::InvalidArgs("item id must not be empty".to_string()));
    }
    Ok(ItemId::parse_token(token))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)
        .map_err(|e| InfraError::io("write json", e.into()))?;
    writeln!(out).map_err(|e| InfraError::io("write json", e))?;
    Ok(())
}

fn item_line(item: &TreeItem, settings: &Settings) -> String {
    if settings.show_ids {
        item.to_string()
    } else {
        item.label.clone()
    }
}

fn print_items(cli: &Cli, settings: &Settings, items: &[&TreeItem]) -> CliResult<()> {
    if cli.json {
        return print_json(items);
    }
    for item in items {
        output::info(&item_line(item, settings));
    }
    Ok(())
}

#[instrument(skip_all)]
fn cmd_tree(cli: &Cli, settings: &Settings) -> CliResult<()> {
    let store = load_store(cli, settings)?;
    if cli.json {
        return print_json(&store.build_tree());
    }
    output::info(&store.to_tree_string(settings.show_ids));
    Ok(())
}

#[instrument(skip(cli, settings))]
fn cmd_get(cli: &Cli, settings: &Settings, id: &str) -> CliResult<()> {
    let store = load_store(cli, settings)?;
    let id = parse_id(id)?;
    let item = store
        .get_item(&id)
        .ok_or_else(|| CliError::NotFound(id.to_string()))?;

    if cli.json {
        return print_json(item);
    }
    output::header(&item.label);
    output::field("id", &item.id);
    match &item.parent {
        Some(parent) => output::field("parent", parent),
        None => output::field("parent", "(root)"),
    }
    for (key, value) in &item.extra {
        output::field(key, value);
    }
    Ok(())
}

#[instrument(skip(cli, settings))]
fn cmd_children(cli: &Cli, settings: &Settings, id: Option<&str>) -> CliResult<()> {
    let store = load_store(cli, settings)?;
    let parent = id.map(parse_id).transpose()?;
    let children = store.get_children(parent.as_ref());
    print_items(cli, settings, &children)
}

#[instrument(skip(cli, settings))]
fn cmd_descendants(cli: &Cli, settings: &Settings, id: &str) -> CliResult<()> {
    let store = load_store(cli, settings)?;
    let id = parse_id(id)?;
    if !store.contains(&id) {
        return Err(CliError::NotFound(id.to_string()));
    }
    let descendants = store.get_all_children(&id);
    print_items(cli, settings, &descendants)
}

#[instrument(skip(cli, settings))]
fn cmd_ancestors(cli: &Cli, settings: &Settings, id: &str) -> CliResult<()> {
    let store = load_store(cli, settings)?;
    let id = parse_id(id)?;
    let chain = store
        .ancestor_chain(&id)
        .ok_or_else(|| CliError::NotFound(id.to_string()))?;

    if cli.json {
        return print_json(&chain.items);
    }
    output::info(
        &chain
            .items
            .iter()
            .map(|item| item_line(item, settings))
            .join(" <- "),
    );
    match &chain.end {
        ChainEnd::Root => {}
        ChainEnd::Broken(missing) => {
            output::warning(&format!("chain truncated, parent {} does not exist", missing))
        }
        ChainEnd::Cycle(at) => output::warning(&format!("chain loops back to {}", at)),
    }
    Ok(())
}

#[instrument(skip(cli, settings))]
fn cmd_rows(cli: &Cli, settings: &Settings, visible: bool) -> CliResult<()> {
    let store = load_store(cli, settings)?;
    let mode = if visible {
        FlattenMode::Visible
    } else {
        FlattenMode::All
    };
    let rows = flatten_rows(&store, mode);

    if cli.json {
        return print_json(&rows);
    }
    for row in &rows {
        let marker = match (row.has_children, row.expanded) {
            (false, _) => " ",
            (true, true) => "-",
            (true, false) => "+",
        };
        let label = if settings.show_ids {
            format!("{} [{}]", row.label, row.id)
        } else {
            row.label.clone()
        };
        output::info(&format!("{}{} {}", "  ".repeat(row.depth), marker, label));
    }
    Ok(())
}

#[instrument(skip_all)]
fn cmd_check(cli: &Cli, settings: &Settings) -> CliResult<()> {
    let store = load_store(cli, settings)?;
    store.validate().map_err(ApplicationError::from)?;
    output::success(&format!("{} items, hierarchy is well-formed", store.len()));
    Ok(())
}

fn cmd_config(command: &ConfigCommands, settings: &Settings, cwd: Option<&Path>) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::field("global", &path.display()),
                None => output::field("global", "(no config directory)"),
            }
            if let Some(dir) = cwd {
                output::field("local", &local_config_path(dir).display());
            }
        }
    }
    Ok(())
}
