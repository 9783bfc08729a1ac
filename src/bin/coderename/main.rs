mod commands;
mod config;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use code_rename::{CaseMode, OutputForm};

use crate::config::Config;

#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Rename files by converting the country or language code in their names"
)]
pub(crate) struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Country catalog JSON file
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    catalog: Option<PathBuf>,

    /// Create shell completion
    #[arg(short = 'l', long, name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Find the identifier in an example filename and show the generated template
    #[command(name = "analyze")]
    Analyze {
        /// Example filename containing a country or language identifier
        example: String,
    },

    /// Show the renames for files matching the example's template
    #[command(name = "preview")]
    Preview(RenameArgs),

    /// Rename files matching the example's template
    #[command(name = "apply")]
    Apply {
        #[command(flatten)]
        rename: RenameArgs,

        /// Only print changes without renaming files
        #[arg(short = 'p', long)]
        print: bool,

        /// Write a rename log under ~/logs/code-rename
        #[arg(short = 'L', long)]
        log: bool,
    },

    /// Convert a single country or language identifier
    #[command(name = "convert")]
    Convert {
        /// Identifier to convert, e.g. "us", "usa", "united states" or "en"
        identifier: String,

        /// Output format
        #[arg(short = 'o', long, value_enum)]
        output: Option<OutputForm>,

        /// Letter case for the converted identifier
        #[arg(short = 'c', long, value_enum)]
        case: Option<CaseMode>,
    },
}

/// Arguments shared by `preview` and `apply`.
#[derive(clap::Args, Debug, Default)]
pub(crate) struct RenameArgs {
    /// Example filename containing a country or language identifier
    example: String,

    /// Input directory
    #[arg(value_hint = clap::ValueHint::DirPath)]
    path: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, value_enum)]
    output: Option<OutputForm>,

    /// Letter case for the converted identifier
    #[arg(short = 'c', long, value_enum)]
    case: Option<CaseMode>,

    /// Replace spaces with underscores in new names
    #[arg(short = 's', long)]
    spaces: bool,

    /// Specify file extension(s)
    #[arg(short = 'e', long, num_args = 1, action = clap::ArgAction::Append, value_name = "EXTENSION")]
    extensions: Vec<String>,

    /// Use this matcher regex instead of the generated one
    #[arg(short = 'x', long, value_name = "REGEX")]
    pattern: Option<String>,

    /// Use this render template instead of the generated one, e.g. "report_{code}_2024"
    #[arg(short = 't', long, value_name = "TEMPLATE")]
    template: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(shell) = args.completion {
        return code_rename::generate_shell_completion(shell, Args::command(), true, env!("CARGO_BIN_NAME"));
    }

    let config = Config::from_args(&args)?;
    match args.command {
        Some(Command::Analyze { example }) => commands::analyze(&config, &example),
        Some(Command::Preview(rename)) => commands::preview(&config, &rename),
        Some(Command::Apply { rename, print, log }) => commands::apply(&config, &rename, print, log),
        Some(Command::Convert {
            identifier,
            output,
            case,
        }) => commands::convert(&config, &identifier, output, case),
        None => {
            Args::command().print_help()?;
            Ok(())
        }
    }
}
