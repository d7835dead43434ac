// src/render.rs
// =============================================================================
// Turns an AuditReport into something a person or a pipeline can read.
//
// Three formats:
// - table: human-readable columns plus a summary (the default)
// - json:  {"analytics": {...}, "details": [...]}, optionally grouped by file
// - csv:   one line per detail row, for spreadsheets
//
// The audit engine knows nothing about any of this. Everything here works
// from the public fields of AuditReport plus a map of document titles.
//
// The link scan and folder analytics are plain serializable values, so
// their JSON is a straight serde dump; only table and CSV need code here.
// =============================================================================

use anyhow::Result;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use crate::audit::{AuditReport, Category, DetailRow};
use crate::cli::OutputFormat;
use crate::inspect::{FolderAnalytics, LinkScan};

/// Shown in place of a status code when the probe got no response
const NO_STATUS: &str = "N/A";

const CSV_HEADER: [&str; 6] = ["file", "title", "anchor", "link", "status_code", "status_category"];

const LINK_CSV_HEADER: [&str; 4] = ["file", "title", "anchor", "link"];

// Document id -> title
pub type Titles = HashMap<String, String>;

#[derive(Serialize)]
struct Analytics<'a> {
    total_links_checked: usize,
    status_counts: &'a BTreeMap<String, usize>,
    cancelled: bool,
}

// One detail row with its document title attached
#[derive(Serialize)]
struct FlatRow<'a> {
    file: &'a str,
    title: &'a str,
    anchor: &'a str,
    link: &'a str,
    status_code: Option<u16>,
    status_category: Category,
}

// A link inside a document section
#[derive(Serialize)]
struct LinkEntry<'a> {
    anchor: &'a str,
    link: &'a str,
    status_code: Option<u16>,
    status_category: Category,
}

#[derive(Serialize)]
struct DocumentSection<'a> {
    file: &'a str,
    title: &'a str,
    links: Vec<LinkEntry<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Details<'a> {
    Rows(Vec<FlatRow<'a>>),
    Documents(Vec<DocumentSection<'a>>),
}

#[derive(Serialize)]
struct JsonReport<'a> {
    analytics: Analytics<'a>,
    details: Details<'a>,
}

// Writes the report in the requested format
//
// Parameters:
//   out: where to write (stdout or a file)
//   report: the finished audit
//   titles: document titles for the "title" column
//   format: table, json or csv
//   by_document: JSON only; group rows under their document
pub fn write_report<W: Write>(
    mut out: W,
    report: &AuditReport,
    titles: &Titles,
    format: OutputFormat,
    by_document: bool,
) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(&mut out, report, titles, by_document)?,
        OutputFormat::Csv => write_csv(&mut out, report, titles)?,
        OutputFormat::Table => write_table(&mut out, report)?,
    }
    out.flush()?;
    Ok(())
}

fn title_of<'a>(titles: &'a Titles, document: &str) -> &'a str {
    titles.get(document).map(String::as_str).unwrap_or("")
}

fn write_json<W: Write>(out: &mut W, report: &AuditReport, titles: &Titles, by_document: bool) -> Result<()> {
    let details = if by_document {
        Details::Documents(group_by_document(&report.details, titles))
    } else {
        Details::Rows(
            report
                .details
                .iter()
                .map(|row| FlatRow {
                    file: &row.document,
                    title: title_of(titles, &row.document),
                    anchor: &row.anchor,
                    link: &row.link,
                    status_code: row.status_code,
                    status_category: row.status_category,
                })
                .collect(),
        )
    };

    let json = JsonReport {
        analytics: Analytics {
            total_links_checked: report.total_checked,
            status_counts: &report.status_counts,
            cancelled: report.cancelled,
        },
        details,
    };

    serde_json::to_writer_pretty(&mut *out, &json)?;
    writeln!(out)?;
    Ok(())
}

// Groups rows under their document, documents in first-appearance order
fn group_by_document<'a>(rows: &'a [DetailRow], titles: &'a Titles) -> Vec<DocumentSection<'a>> {
    let mut sections: Vec<DocumentSection<'a>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        let position = *index.entry(row.document.as_str()).or_insert_with(|| {
            sections.push(DocumentSection {
                file: &row.document,
                title: title_of(titles, &row.document),
                links: Vec::new(),
            });
            sections.len() - 1
        });

        sections[position].links.push(LinkEntry {
            anchor: &row.anchor,
            link: &row.link,
            status_code: row.status_code,
            status_category: row.status_category,
        });
    }

    sections
}

fn write_csv<W: Write>(out: &mut W, report: &AuditReport, titles: &Titles) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(CSV_HEADER)?;

    for row in &report.details {
        let status_code = row
            .status_code
            .map(|code| code.to_string())
            .unwrap_or_else(|| NO_STATUS.to_string());
        let category = row.status_category.to_string();

        writer.write_record([
            row.document.as_str(),
            title_of(titles, &row.document),
            row.anchor.as_str(),
            row.link.as_str(),
            status_code.as_str(),
            category.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

// Prints results as a human-readable table
fn write_table<W: Write>(out: &mut W, report: &AuditReport) -> Result<()> {
    if !report.details.is_empty() {
        writeln!(out, "{:<30} {:<60} {:<8} {:<16} {}", "FILE", "URL", "CODE", "CATEGORY", "ANCHOR")?;
        writeln!(out, "{}", "=".repeat(130))?;

        for row in &report.details {
            let code = row
                .status_code
                .map(|code| code.to_string())
                .unwrap_or_else(|| NO_STATUS.to_string());

            writeln!(
                out,
                "{:<30} {:<60} {:<8} {:<16} {}",
                truncate(&row.document, 30),
                truncate(&row.link, 60),
                code,
                row.status_category.to_string(),
                row.anchor
            )?;
        }
        writeln!(out)?;
    }

    writeln!(out, "📊 Summary:")?;
    for (category, count) in &report.status_counts {
        writeln!(out, "   {:<16} {}", category, count)?;
    }
    writeln!(out, "   ❌ Broken: {}", report.broken_count())?;
    writeln!(out, "   📋 Total checked: {}", report.total_checked)?;
    if report.cancelled {
        writeln!(out, "   ⚠️  Audit was cancelled before every link was checked")?;
    }

    Ok(())
}

// Writes the result of `link-audit links`
pub fn write_link_scan<W: Write>(mut out: W, scan: &LinkScan, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, scan)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut out);
            writer.write_record(LINK_CSV_HEADER)?;
            for row in &scan.details {
                writer.write_record([&row.file, &row.title, &row.anchor, &row.link])?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => {
            if !scan.details.is_empty() {
                writeln!(out, "{:<30} {:<70} {}", "FILE", "LINK", "ANCHOR")?;
                writeln!(out, "{}", "=".repeat(120))?;
                for row in &scan.details {
                    writeln!(
                        out,
                        "{:<30} {:<70} {}",
                        truncate(&row.file, 30),
                        truncate(&row.link, 70),
                        row.anchor
                    )?;
                }
                writeln!(out)?;
            }

            writeln!(out, "📊 Summary:")?;
            writeln!(out, "   Files scanned: {}", scan.analytics.files_scanned)?;
            writeln!(out, "   Files with matches: {}", scan.analytics.files_with_matches)?;
            writeln!(out, "   Links found: {}", scan.analytics.total_links_found)?;
        }
    }
    out.flush()?;
    Ok(())
}

// Writes the result of `link-audit analytics`
//
// CSV has no natural row shape here, so it is one metric per line.
pub fn write_analytics<W: Write>(mut out: W, analytics: &FolderAnalytics, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        serde_json::to_writer_pretty(&mut out, analytics)?;
        writeln!(out)?;
        out.flush()?;
        return Ok(());
    }

    let metrics = [
        ("files_scanned", analytics.files_scanned),
        ("total_lines", analytics.total_lines),
        ("code_blocks_total", analytics.code_blocks.total),
        ("code_blocks_tagged", analytics.code_blocks.tagged),
        ("code_blocks_untagged", analytics.code_blocks.untagged),
        ("links_external", analytics.links.total_external),
        ("links_internal", analytics.links.total_internal),
        ("stub_pages", analytics.content.stubs),
        ("todos", analytics.content.todos),
    ];

    if format == OutputFormat::Csv {
        let mut writer = csv::Writer::from_writer(&mut out);
        writer.write_record(["metric", "value"])?;
        for (metric, value) in metrics {
            writer.write_record([metric, value.to_string().as_str()])?;
        }
        writer.flush()?;
    } else {
        writeln!(out, "📊 Folder analytics:")?;
        for (metric, value) in metrics {
            writeln!(out, "   {:<22} {}", metric, value)?;
        }
    }

    out.flush()?;
    Ok(())
}

// Shortens long values so columns stay aligned
fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let kept: String = value.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}
