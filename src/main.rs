// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Load the Markdown documents (local folder or GitHub README)
// 3. Extract link occurrences and run the audit
// 4. Render the report and exit with a proper code
//    (0 = no broken links, 1 = broken links, 2 = error)
//
// The `links` and `analytics` commands stop after step 2, compute their
// view offline, and exit with 0 unless something went wrong.
//
// Logging goes to stderr through `tracing`, so stdout only ever carries the
// report itself and can be piped into jq or a CSV file.
// =============================================================================

mod audit;
mod cli;
mod documents;
mod error;
mod inspect;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use audit::AuditReport;
use cli::{AuditArgs, Cli, Commands, OutputFormat};
use documents::Document;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "link_audit=debug" } else { "link_audit=info" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

// Returns:
//   Ok(0) = no broken links (or an offline command finished)
//   Ok(1) = broken links found
//   Err = anything that stopped the command from running
async fn run(cli: Cli) -> Result<i32> {
    let (documents, args) = match cli.command {
        Commands::Scan { folder, audit } => {
            info!("Scanning folder: {}", folder.display());
            (documents::load_folder(&folder)?, audit)
        }
        Commands::Github { repo_url, audit } => {
            info!("Scanning GitHub repository: {}", repo_url);
            (documents::fetch_repo_readme(&repo_url).await?, audit)
        }
        Commands::Links {
            folder,
            scope,
            prefix,
            report,
        } => {
            let scope = scope.to_scope(prefix)?;
            let documents = documents::read_folder(&folder)?;
            let scan = inspect::scan_links(&documents, &scope);

            info!(
                "Found {} matching link(s) in {} of {} document(s)",
                scan.analytics.total_links_found,
                scan.analytics.files_with_matches,
                scan.analytics.files_scanned
            );
            render::write_link_scan(open_output(report.output.as_deref())?, &scan, report.format)?;
            return Ok(0);
        }
        Commands::Analytics { folder, report } => {
            let documents = documents::read_folder(&folder)?;
            if documents.is_empty() {
                warn!("No .md files found in {}", folder.display());
            }

            let analytics = inspect::analyze(&documents);
            render::write_analytics(open_output(report.output.as_deref())?, &analytics, report.format)?;
            return Ok(0);
        }
    };

    let report = audit_documents(&documents, &args).await?;

    let titles: render::Titles = documents
        .iter()
        .map(|doc| (doc.id.clone(), doc.title.clone()))
        .collect();
    write_output(&report, &titles, &args)?;

    if report.broken_count() > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

async fn audit_documents(documents: &[Document], args: &AuditArgs) -> Result<AuditReport> {
    let options = args.to_options()?;
    let occurrences = documents::collect_occurrences(documents);

    info!(
        "Found {} link(s) in {} document(s)",
        occurrences.len(),
        documents.len()
    );

    // Ctrl-C stops new checks; links already in flight still finish
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing in-flight checks");
            on_interrupt.cancel();
        }
    });

    let report = audit::audit_links(occurrences, &options, cancel).await;
    interrupt.abort();

    Ok(report?)
}

fn write_output(report: &AuditReport, titles: &render::Titles, args: &AuditArgs) -> Result<()> {
    if args.report.format == OutputFormat::Csv && report.details.is_empty() {
        warn!("No details to export, writing the CSV header only");
    }

    let out = open_output(args.report.output.as_deref())?;
    render::write_report(out, report, titles, args.report.format, args.by_document)?;

    if let Some(path) = &args.report.output {
        info!("Report written to {}", path.display());
    }
    Ok(())
}

// A file when --output is given, stdout otherwise
fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    })
}
