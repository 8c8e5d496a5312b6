//! capcheck - AI caption compliance reviewer
//!
//! Generates marketing captions through a Dify chat workflow, reviews them
//! for Pharmaceutical and Medical Device Act (薬機法) compliance with an
//! OpenAI model, and selects hashtags from a curated keyword list.
//!
//! The heart of the crate is the span reconciliation engine: model
//! findings claim a phrase and an approximate character position, and the
//! engine turns those unreliable claims into verified, non-overlapping
//! spans of the caption suitable for highlighting.
//!
//! # Modules
//!
//! - `reconcile`: span reconciliation engine (validate, recover, verify,
//!   overlap resolution)
//! - `adapters`: external service clients (OpenAI, Dify)
//! - `review`: compliance review orchestration and prompts
//! - `knowledge`: regulated-expression knowledge base
//! - `hashtags`: keyword list and AI-backed selection
//! - `domain`: wire types and the review history record
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Review a caption
//! echo "朝はふんわり、夜はしっとり" | capcheck review
//!
//! # Select hashtags
//! capcheck hashtags --input caption.txt
//!
//! # Generate a caption
//! capcheck generate --proposal "新商品の企画概要" --intent "保湿訴求"
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod hashtags;
pub mod knowledge;
pub mod reconcile;
pub mod review;

// Re-export main types at crate root for convenience
pub use adapters::{ChatModel, DifyClient, OpenAiClient, ServiceError};
pub use domain::{DetectedIssue, HashtagSet, ReviewRecord, ReviewReport};
pub use hashtags::HashtagSelector;
pub use knowledge::KnowledgeItem;
pub use reconcile::{reconcile, RawFinding, ReconciliationResult, ResolvedSpan};
pub use review::Reviewer;
