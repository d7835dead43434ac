// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands audit links, picking where the Markdown comes from:
//   link-audit scan ./docs
//   link-audit github https://github.com/user/repo
//
// Both share the same audit flags (AuditArgs), pulled in with
// #[command(flatten)] so they are declared only once.
//
// Two more look at a folder without touching the network:
//   link-audit links ./docs --scope starting-with --prefix https://old.example/
//   link-audit analytics ./docs --format json
// =============================================================================

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::audit::{AuditOptions, DEFAULT_CONCURRENCY};
use crate::inspect::LinkScope;

#[derive(Parser, Debug)]
#[command(
    name = "link-audit",
    version,
    about = "Audit the links of Markdown documentation and report their HTTP status",
    long_about = "link-audit finds every http(s) link and image in a set of Markdown files, \
                  checks each distinct URL once, and reports where the broken ones are used. \
                  Exit code 0 means no broken links, 1 means broken links were found, 2 means an error."
)]
pub struct Cli {
    /// Log progress details to stderr (same as RUST_LOG=link_audit=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Audit every .md file below a local folder
    ///
    /// Example: link-audit scan ./docs --status 4xx,5xx,Other
    Scan {
        /// Folder to search for Markdown files
        folder: PathBuf,

        #[command(flatten)]
        audit: AuditArgs,
    },

    /// Audit the README of a GitHub repository
    ///
    /// Example: link-audit github https://github.com/rust-lang/rust --format json
    Github {
        /// GitHub repository URL (e.g., https://github.com/user/repo)
        repo_url: String,

        #[command(flatten)]
        audit: AuditArgs,
    },

    /// List the links of every .md file below a folder, without checking them
    ///
    /// Example: link-audit links ./docs --scope internal --format csv
    Links {
        /// Folder to search for Markdown files
        folder: PathBuf,

        /// Which links to list
        #[arg(long, value_enum, default_value_t = ScopeArg::External)]
        scope: ScopeArg,

        /// URL prefix for --scope starting-with
        #[arg(long)]
        prefix: Option<String>,

        #[command(flatten)]
        report: OutputArgs,
    },

    /// Count lines, links, code blocks, stub pages and TODOs below a folder
    Analytics {
        /// Folder to search for Markdown files
        folder: PathBuf,

        #[command(flatten)]
        report: OutputArgs,
    },
}

// Where and how a result is written
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeArg {
    /// Relative links to other files
    Internal,
    /// Absolute http(s) links
    External,
    /// Links starting with --prefix
    StartingWith,
}

impl ScopeArg {
    pub fn to_scope(self, prefix: Option<String>) -> Result<LinkScope> {
        match (self, prefix) {
            (ScopeArg::Internal, _) => Ok(LinkScope::Internal),
            (ScopeArg::External, _) => Ok(LinkScope::External),
            (ScopeArg::StartingWith, Some(prefix)) if !prefix.is_empty() => Ok(LinkScope::StartingWith(prefix)),
            (ScopeArg::StartingWith, _) => bail!("--scope starting-with needs a non-empty --prefix"),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct AuditArgs {
    /// Statuses to list in the details: codes (404), categories (4xx, Timeout,
    /// ConnectionError, InvalidURL), "Other" for all failures, or "*"
    ///
    /// Summary counts always cover every link.
    #[arg(long, value_delimiter = ',', default_value = "*")]
    pub status: Vec<String>,

    /// Maximum number of links checked at the same time
    #[arg(long, env = "LINK_AUDIT_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, env = "LINK_AUDIT_TIMEOUT", default_value_t = 7)]
    pub timeout: u64,

    /// Stop claiming new links after this many seconds
    #[arg(long, env = "LINK_AUDIT_DEADLINE")]
    pub deadline: Option<u64>,

    /// Group JSON details under the document they were found in
    #[arg(long)]
    pub by_document: bool,

    #[command(flatten)]
    pub report: OutputArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl AuditArgs {
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            bail!("--concurrency must be greater than 0");
        }
        if self.timeout == 0 {
            bail!("--timeout must be greater than 0");
        }
        if self.deadline == Some(0) {
            bail!("--deadline must be greater than 0");
        }
        Ok(())
    }

    pub fn to_options(&self) -> Result<AuditOptions> {
        self.validate()?;

        Ok(AuditOptions::default()
            .with_concurrency(self.concurrency)
            .with_request_timeout(Duration::from_secs(self.timeout))
            .with_requested_categories(self.status.iter().cloned())
            .with_deadline(self.deadline.map(Duration::from_secs)))
    }
}
