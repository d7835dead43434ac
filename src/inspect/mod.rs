// src/inspect/mod.rs
// =============================================================================
// Offline views of a documentation folder. Nothing here touches the network.
//
// - links: lists the links of every document, narrowed to internal,
//   external, or a URL prefix
// - analytics: folder-wide counts (lines, links, code fences, stub pages,
//   TODO markers)
//
// Both work on the same Documents the audit reads, so a folder can be
// inspected first and audited afterwards with identical parsing.
// =============================================================================

mod analytics;
mod links;

pub use analytics::{analyze, FolderAnalytics};
pub use links::{scan_links, LinkScan, LinkScope};
