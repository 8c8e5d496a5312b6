//! Review history ledger.
//!
//! Completed reviews are appended to `$CAPCHECK_HOME/history.jsonl`, one
//! JSON record per line, under an exclusive file lock so concurrent
//! invocations don't interleave lines.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::config;
use crate::domain::ReviewRecord;

/// Append one record to the ledger.
pub fn append_record(record: &ReviewRecord) -> Result<()> {
    let path = config::history_path()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create home directory: {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open history ledger: {}", path.display()))?;

    file.lock_exclusive()
        .context("Failed to lock history ledger")?;

    let line = serde_json::to_string(record)?;
    let result = writeln!(&file, "{}", line).context("Failed to append history record");

    let _ = fs2::FileExt::unlock(&file);
    result
}

/// Read the most recent `limit` records, newest first.
pub fn recent_records(limit: usize) -> Result<Vec<ReviewRecord>> {
    let path = config::history_path()?;
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = std::fs::File::open(&path)
        .with_context(|| format!("Failed to open history ledger: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: ReviewRecord = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse history record: {}", line))?;
        records.push(record);
    }

    records.reverse();
    records.truncate(limit);
    Ok(records)
}

/// Print recent reviews as a table
pub fn show_history(limit: usize) -> Result<()> {
    let records = recent_records(limit)?;

    if records.is_empty() {
        println!("No reviews recorded");
        return Ok(());
    }

    println!("{:<25} {:<8} {:<7} {}", "REVIEWED", "VERDICT", "ISSUES", "CAPTION DIGEST");
    println!("{}", "-".repeat(78));

    for record in records {
        let verdict = if record.report.passed { "passed" } else { "failed" };
        // Digest is "sha256:<64 hex>"; the first 12 hex chars identify it.
        let digest = record
            .caption_sha256
            .strip_prefix("sha256:")
            .unwrap_or(&record.caption_sha256);
        println!(
            "{:<25} {:<8} {:<7} {}",
            record.reviewed_at.format("%Y-%m-%d %H:%M:%S UTC"),
            verdict,
            record.report.total_issues,
            &digest[..digest.len().min(12)]
        );
    }

    Ok(())
}
