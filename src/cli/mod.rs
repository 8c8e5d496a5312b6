//! Command-line interface for capcheck.
//!
//! Provides commands for reviewing captions, selecting hashtags,
//! generating and revising captions through Dify, and managing the
//! knowledge base.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{CaptionInputs, DifyClient, OpenAiClient};
use crate::config;
use crate::domain::{ReviewRecord, ReviewReport};
use crate::hashtags::HashtagSelector;
use crate::review::Reviewer;

pub mod history;
pub mod knowledge;

/// capcheck - AI caption compliance reviewer
#[derive(Parser, Debug)]
#[command(name = "capcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Review a caption for compliance issues
    Review {
        /// Caption file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print the report as JSON instead of a human summary
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip appending the review to the history ledger
        #[arg(long)]
        no_history: bool,
    },

    /// Select hashtags for a caption
    Hashtags {
        /// Caption file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print the selection as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a caption via the Dify workflow
    Generate {
        /// Planning proposal text
        #[arg(long, default_value = "")]
        proposal: String,

        /// Planning intent text
        #[arg(long, default_value = "")]
        intent: String,

        /// Reference URLs (up to 3)
        #[arg(long = "ref-url")]
        ref_urls: Vec<String>,

        /// Reference documents to upload
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,
    },

    /// Revise a previously generated caption
    Revise {
        /// Revision instruction
        query: String,

        /// Conversation ID from a previous generate/revise call
        #[arg(short, long)]
        conversation_id: Option<String>,
    },

    /// Manage the knowledge base
    Knowledge {
        #[command(subcommand)]
        command: knowledge::KnowledgeCommands,
    },

    /// List recent reviews from the history ledger
    History {
        /// Maximum number of records to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Review {
                input,
                json,
                output,
                no_history,
            } => review_caption(input, json, output, no_history).await,
            Commands::Hashtags { input, json } => select_hashtags(input, json).await,
            Commands::Generate {
                proposal,
                intent,
                ref_urls,
                files,
            } => generate_caption(proposal, intent, ref_urls, files).await,
            Commands::Revise {
                query,
                conversation_id,
            } => revise_caption(&query, conversation_id.as_deref()).await,
            Commands::Knowledge { command } => knowledge::execute(command).await,
            Commands::History { limit } => history::show_history(limit),
            Commands::Config => show_config(),
        }
    }
}

/// Read the caption from a file, or from stdin when piped.
fn read_caption(input: Option<PathBuf>) -> Result<String> {
    let caption = if let Some(path) = input {
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read caption file: {}", path.display()))?
    } else if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        anyhow::bail!("No caption provided. Use --input <file> or pipe to stdin");
    };

    if caption.trim().is_empty() {
        anyhow::bail!("Caption is empty");
    }

    Ok(caption)
}

/// Build the OpenAI-backed chat model from configuration.
fn openai_client() -> Result<OpenAiClient> {
    let cfg = config::config()?;
    let api_key = cfg
        .openai
        .api_key
        .clone()
        .context("OPENAI_API_KEY is not configured")?;

    Ok(match &cfg.openai.endpoint {
        Some(endpoint) => {
            OpenAiClient::with_endpoint(api_key, cfg.openai.model.clone(), endpoint.clone())
        }
        None => OpenAiClient::new(api_key, cfg.openai.model.clone()),
    })
}

/// Build the Dify client from configuration.
fn dify_client() -> Result<DifyClient> {
    let cfg = config::config()?;
    let endpoint = cfg
        .dify
        .endpoint
        .clone()
        .context("DIFY_API_ENDPOINT is not configured")?;
    let api_key = cfg
        .dify
        .api_key
        .clone()
        .context("DIFY_API_KEY is not configured")?;
    Ok(DifyClient::new(endpoint, api_key))
}

/// Review a caption and print/persist the report
async fn review_caption(
    input: Option<PathBuf>,
    json: bool,
    output: Option<PathBuf>,
    no_history: bool,
) -> Result<()> {
    let caption = read_caption(input)?;
    let cfg = config::config()?;

    let reviewer = Reviewer::new(Box::new(openai_client()?), cfg.review.max_caption_bytes);
    let report = reviewer.review(&caption).await?;

    if !no_history {
        let record = ReviewRecord::new(&caption, reviewer.model_name(), report.clone());
        if let Err(e) = history::append_record(&record) {
            tracing::warn!("failed to append review history: {:#}", e);
        }
    }

    if let Some(path) = &output {
        let content = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        eprintln!("[Report written to {}]", path.display());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&caption, &report);
    }

    if !report.passed {
        std::process::exit(1);
    }
    Ok(())
}

/// Human-readable review summary
fn print_report(caption: &str, report: &ReviewReport) {
    if report.passed {
        println!("PASSED: no compliance issues detected");
    } else {
        println!("FAILED: {} issue(s) detected", report.total_issues);
    }

    let chars: Vec<char> = caption.chars().collect();
    for issue in &report.issues {
        let slice: String = chars[issue.position.start..issue.position.end.min(chars.len())]
            .iter()
            .collect();
        println!();
        println!(
            "  [{}..{}] {}",
            issue.position.start, issue.position.end, slice
        );
        if !issue.name.is_empty() {
            println!("    expression: {}", issue.name);
        }
        println!("    reason: {}", issue.reason);
        println!("    id: {}", issue.knowledge_id);
    }
}

/// Select hashtags for a caption
async fn select_hashtags(input: Option<PathBuf>, json: bool) -> Result<()> {
    let caption = read_caption(input)?;
    let path = config::hashtags_path()?;

    let selector = HashtagSelector::new(Box::new(openai_client()?));
    let set = selector.select(&caption, &path).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&set)?);
    } else {
        println!(
            "{}",
            set.hashtags
                .iter()
                .map(|t| format!("#{}", t))
                .collect::<Vec<_>>()
                .join(" ")
        );
        eprintln!(
            "[{} fixed, {} selected]",
            set.fixed_hashtags.len(),
            set.selected_hashtags.len()
        );
    }

    Ok(())
}

/// Generate a caption via Dify
async fn generate_caption(
    proposal: String,
    intent: String,
    ref_urls: Vec<String>,
    files: Vec<PathBuf>,
) -> Result<()> {
    if ref_urls.len() > 3 {
        anyhow::bail!("At most 3 reference URLs are supported");
    }

    let mut urls = ref_urls.into_iter();
    let inputs = CaptionInputs {
        planning_proposal: proposal,
        planning_intent: intent,
        ref_url1: urls.next().unwrap_or_default(),
        ref_url2: urls.next().unwrap_or_default(),
        ref_url3: urls.next().unwrap_or_default(),
    };

    let client = dify_client()?;
    let caption = client.generate(&inputs, &files).await?;

    println!("{}", caption.answer);
    eprintln!("\n[conversation: {}]", caption.conversation_id);
    Ok(())
}

/// Revise a caption via Dify
async fn revise_caption(query: &str, conversation_id: Option<&str>) -> Result<()> {
    let client = dify_client()?;
    let caption = client.revise(query, conversation_id).await?;

    println!("{}", caption.answer);
    eprintln!("\n[conversation: {}]", caption.conversation_id);
    Ok(())
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("home:       {}", cfg.home.display());
    println!("knowledge:  {}", cfg.knowledge.display());
    println!("hashtags:   {}", cfg.hashtags.display());
    println!("model:      {}", cfg.openai.model);
    println!(
        "openai key: {}",
        if cfg.openai.api_key.is_some() {
            "configured"
        } else {
            "missing"
        }
    );
    println!(
        "dify:       {}",
        cfg.dify.endpoint.as_deref().unwrap_or("not configured")
    );
    match &cfg.config_file {
        Some(path) => println!("config:     {}", path.display()),
        None => println!("config:     (defaults)"),
    }

    Ok(())
}
