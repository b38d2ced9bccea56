//! Generates Markdown documentation for a command definition document.
use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use imperative::{
    definition::{CommandDefinition, CommandTree},
    docs::{DocsGenerator, definition_schema},
};

#[derive(Parser)]
#[command(name = "generate-docs")]
#[command(about = "Generate documentation for an imperative command tree")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a page for every command plus the configuration page
    All {
        /// Definition document (TOML or JSON)
        #[arg(short, long)]
        definitions: PathBuf,
        /// Name the CLI is invoked by
        #[arg(short, long, default_value = "sample-cli")]
        program: String,
        #[arg(short, long, default_value = "docs/commands")]
        output: String,
    },
    /// Generate the page of one command
    Command {
        /// Command path, e.g. `eat banana`
        path: Vec<String>,
        #[arg(short, long)]
        definitions: PathBuf,
        #[arg(short, long, default_value = "sample-cli")]
        program: String,
        #[arg(short, long, default_value = "docs/commands")]
        output: String,
    },
    /// List every command in the document
    List {
        #[arg(short, long)]
        definitions: PathBuf,
    },
    /// Write the JSON schema of definition documents
    Schema {
        #[arg(short, long, default_value = "docs/commands")]
        output: String,
    },
}

fn load_tree(definitions: &Path) -> Result<CommandTree, Box<dyn std::error::Error>> {
    let root = CommandDefinition::load(definitions)?;
    Ok(CommandTree::new(root)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::All {
            definitions,
            program,
            output,
        } => {
            let generator = DocsGenerator::new(load_tree(&definitions)?, program).with_output_dir(output);
            let written = generator.generate_all()?;
            println!("Wrote {} files", written.len());
        }
        Commands::Command {
            path,
            definitions,
            program,
            output,
        } => {
            let generator = DocsGenerator::new(load_tree(&definitions)?, program).with_output_dir(output);
            let file = generator.generate_command(&path)?;
            println!("Wrote {}", file.display());
        }
        Commands::List { definitions } => {
            let generator = DocsGenerator::new(load_tree(&definitions)?, "");
            println!("Available commands:");
            for command in generator.list_commands() {
                println!("  - {}", command);
            }
        }
        Commands::Schema { output } => {
            fs::create_dir_all(&output)?;
            let file = PathBuf::from(output).join("definition.schema.json");
            fs::write(&file, serde_json::to_string_pretty(&definition_schema())?)?;
            println!("Wrote {}", file.display());
        }
    }

    Ok(())
}
