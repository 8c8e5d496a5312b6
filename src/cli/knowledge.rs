//! Knowledge CLI subcommands for inspecting and importing the knowledge
//! base.
//!
//! Provides commands to:
//! - `list`: Show all knowledge items
//! - `show`: Display one item's rule document and patterns
//! - `parse`: Import a SQL dump into knowledge.json

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config;
use crate::knowledge::{self, parser};

/// Knowledge-related subcommands
#[derive(Subcommand, Debug)]
pub enum KnowledgeCommands {
    /// List knowledge items
    List,

    /// Show details of a knowledge item (by id or expression name)
    Show {
        /// Item id or expression name
        expression: String,
    },

    /// Parse a SQL dump into knowledge.json
    Parse {
        /// SQL dump file exported from the knowledge database
        sql_file: PathBuf,

        /// Output path (defaults to the configured knowledge.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Execute knowledge subcommands
pub async fn execute(command: KnowledgeCommands) -> Result<()> {
    match command {
        KnowledgeCommands::List => list_items(),
        KnowledgeCommands::Show { expression } => show_item(&expression),
        KnowledgeCommands::Parse { sql_file, output } => parse_dump(&sql_file, output),
    }
}

fn list_items() -> Result<()> {
    let items = knowledge::knowledge()?;

    if items.is_empty() {
        println!("No knowledge items loaded");
        return Ok(());
    }

    println!("{:<38} {:<16} {}", "ID", "EXPRESSION", "PATTERNS");
    println!("{}", "-".repeat(70));
    for item in items {
        println!(
            "{:<38} {:<16} {}",
            item.id,
            item.name,
            item.search_patterns.len()
        );
    }
    println!("\n{} item(s)", items.len());

    Ok(())
}

fn show_item(expression: &str) -> Result<()> {
    let items = knowledge::knowledge()?;
    let item = knowledge::find_by_expression(items, expression)
        .with_context(|| format!("No knowledge item matches '{}'", expression))?;

    println!("ID:         {}", item.id);
    println!("Expression: {}", item.name);
    if !item.search_patterns.is_empty() {
        println!("Search:     {}", item.search_patterns.join(", "));
    }
    if !item.ng_patterns.is_empty() {
        println!("NG:         {}", item.ng_patterns.join(", "));
    }
    println!("\n{}", item.content);

    Ok(())
}

fn parse_dump(sql_file: &PathBuf, output: Option<PathBuf>) -> Result<()> {
    let sql = std::fs::read_to_string(sql_file)
        .with_context(|| format!("Failed to read SQL dump: {}", sql_file.display()))?;

    let items = parser::parse_sql_dump(&sql)?;

    let output = match output {
        Some(path) => path,
        None => config::knowledge_path()?,
    };

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(&items)?;
    std::fs::write(&output, content)
        .with_context(|| format!("Failed to write knowledge file: {}", output.display()))?;

    println!("Parsed {} knowledge item(s)", items.len());
    println!("Written to {}", output.display());

    Ok(())
}
