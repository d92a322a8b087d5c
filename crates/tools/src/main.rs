use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sublayers::{SublayerId, TreeOptions};
use tools::{
    CommandError, ToggleRequest, aggregate_enabled, cmd_leaves, cmd_toggle, cmd_tree,
    export_tree, load_tree,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect and toggle building sublayer visibility")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct LoadOpts {
    /// Sublayer metadata JSON file
    file: PathBuf,

    /// Derive group visibility from leaves on load (or set ATLAS_AGGREGATE=1)
    #[arg(long)]
    aggregate: bool,

    /// Open every group regardless of the stored expand flags
    #[arg(long)]
    expand_all: bool,
}

impl LoadOpts {
    fn options(&self) -> TreeOptions {
        TreeOptions {
            aggregate_on_load: aggregate_enabled(self.aggregate),
            expand_all: self.expand_all,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the explorer rows
    Tree {
        #[command(flatten)]
        load: LoadOpts,

        /// Emit rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every leaf in depth-first order
    Leaves {
        #[command(flatten)]
        load: LoadOpts,
    },

    /// Click row checkboxes in order and report the renderer notifications
    Toggle {
        #[command(flatten)]
        load: LoadOpts,

        /// Sublayer id whose checkbox is clicked (repeatable)
        #[arg(long = "id", required = true)]
        ids: Vec<u64>,

        /// Sublayer id whose expand icon is clicked first (repeatable)
        #[arg(long)]
        expand: Vec<u64>,

        /// Write the resulting tree state to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), CommandError> {
    let args = Args::parse();

    match args.command {
        Command::Tree { load, json } => {
            let tree = load_tree(&load.file, load.options())?;
            print!("{}", cmd_tree(tree, json)?);
        }
        Command::Leaves { load } => {
            let tree = load_tree(&load.file, load.options())?;
            print!("{}", cmd_leaves(&tree));
        }
        Command::Toggle {
            load,
            ids,
            expand,
            export,
        } => {
            let tree = load_tree(&load.file, load.options())?;
            let request = ToggleRequest {
                toggle: ids.into_iter().map(SublayerId).collect(),
                expand: expand.into_iter().map(SublayerId).collect(),
            };
            let (tree, out) = cmd_toggle(tree, &request)?;
            print!("{out}");
            if let Some(path) = export {
                export_tree(&tree, &path)?;
            }
        }
    }

    Ok(())
}
