//! `permtree`: inspect permission tokens and resolve paths against the
//! persisted tree.
//!
//! Exit status is 0 on success, 1 when `check` denies the path and 2 on any
//! error. Without a store path nothing survives the process.

#![forbid(unsafe_code)]

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand};

use permtree_infra::config::{ENV_OBFUSCATE, ENV_STORAGE_KEY, ENV_STORE_PATH};
use permtree_infra::{DEFAULT_TREE_KEY, DynStore, PermissionService, ServiceConfig};

#[derive(Parser, Debug)]
#[command(name = "permtree", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON file backing the store; in-memory when unset
    #[arg(long, global = true, env = ENV_STORE_PATH)]
    store_path: Option<PathBuf>,

    /// Key the tree is stored under
    #[arg(long, global = true, env = ENV_STORAGE_KEY, default_value = DEFAULT_TREE_KEY)]
    storage_key: String,

    /// Apply the at-rest transform to stored values
    #[arg(
        long,
        global = true,
        env = ENV_OBFUSCATE,
        default_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    obfuscate: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Decode a token, store its tree and print the token info
    Apply { token: String },
    /// Explain the decision for a path
    Check { path: String },
    /// Print the effective action set for a path
    Actions { path: String },
    /// Print the stored tree
    Tree,
    /// Drop the stored tree
    Clear,
}

/// Successful command result, mapped onto the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Done,
    Denied,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Done => ExitCode::SUCCESS,
            Outcome::Denied => ExitCode::from(1),
        }
    }
}

impl Cli {
    fn config(&self) -> ServiceConfig {
        ServiceConfig {
            storage_key: self.storage_key.clone(),
            store_path: self.store_path.clone(),
            obfuscate: self.obfuscate,
        }
    }
}

fn main() -> ExitCode {
    permtree_observability::init_with_default_filter("warn");

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            // --help / --version
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(2);
        }
    };

    match run(&cli, &mut std::io::stdout().lock()) {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<Outcome> {
    let service = PermissionService::<DynStore>::from_config(&cli.config());

    match &cli.command {
        Command::Apply { token } => {
            let info = service
                .apply_token(token)
                .context("failed to persist permission tree")?
                .context("token carries no usable permission data")?;
            print_json(out, &info)?;
        }
        Command::Check { path } => {
            service.load_tree();
            let explanation = service.explain(path);
            print_json(out, &explanation)?;
            if !explanation.granted {
                return Ok(Outcome::Denied);
            }
        }
        Command::Actions { path } => {
            service.load_tree();
            print_json(out, &service.get_actions(path))?;
        }
        Command::Tree => match service.load_tree() {
            Some(tree) => print_json(out, &*tree)?,
            None => bail!("no permission tree is stored"),
        },
        Command::Clear => service.clear().context("failed to clear storage")?,
    }

    Ok(Outcome::Done)
}

fn print_json<T: serde::Serialize + ?Sized>(out: &mut impl Write, value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    writeln!(out, "{rendered}").context("failed to write output")?;
    Ok(())
}
