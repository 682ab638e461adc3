//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Inspect hierarchical item documents: tree view, lookups, ancestry, well-formedness
#[derive(Parser, Debug)]
#[command(name = "rstree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Item document (default: items_file from config)
    #[arg(short, long, global = true, env = "RSTREE_FILE", value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the hierarchy as a tree
    Tree,

    /// Show a single item
    Get {
        /// Item id (numeric ids are integers, prefix with s: to force a string)
        id: String,
    },

    /// List direct children (roots when no id is given)
    Children {
        /// Parent item id
        id: Option<String>,
    },

    /// List all descendants of an item
    Descendants {
        /// Item id
        id: String,
    },

    /// Show the item and its ancestors up to the root
    Ancestors {
        /// Item id
        id: String,
    },

    /// Show the flattened rows a grid would render
    Rows {
        /// Hide children of collapsed items
        #[arg(long)]
        visible: bool,
    },

    /// Check ids are unique, parents resolve and there are no cycles
    Check,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective config
    Show,

    /// Show config paths
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_file_env_var_when_parsing_then_it_fills_file_unless_flag_given() {
        std::env::set_var("RSTREE_FILE", "/tmp/from-env.json");
        let from_env = Cli::try_parse_from(["rstree", "tree"]);
        let from_flag = Cli::try_parse_from(["rstree", "-f", "cli.json", "tree"]);
        std::env::remove_var("RSTREE_FILE");

        assert_eq!(
            from_env.unwrap().file,
            Some(PathBuf::from("/tmp/from-env.json"))
        );
        assert_eq!(from_flag.unwrap().file, Some(PathBuf::from("cli.json")));
    }
}
