// src/documents/markdown.rs
// =============================================================================
// This module extracts link occurrences from Markdown text.
//
// We use the `pulldown-cmark` crate which:
// - Parses Markdown into events (heading, paragraph, link, etc.)
// - Follows the CommonMark specification
// - Resolves reference-style links ([text][ref]) for us
//
// Two shapes are recognized:
//   [text](https://...)    -> occurrence with anchor "text"
//   ![alt](https://...)    -> occurrence with anchor "[Image]"
//
// The audit only sees http:// and https:// destinations. The link scan and
// the folder analytics see every destination except in-page "#fragment"
// jumps, so relative links count as internal.
//
// Fenced code blocks are reported through their info string ("rust",
// "bash", or empty when untagged).
// =============================================================================

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag};

use super::Document;
use crate::audit::LinkOccurrence;

/// Anchor text used for embedded images
pub const IMAGE_ANCHOR: &str = "[Image]";

/// Title used when a document has no level-1 heading
pub const UNTITLED: &str = "No H1 Title Found";

// A link or image destination with its anchor text, as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub url: String,
    pub anchor: String,
}

// A link we are currently inside of
struct OpenLink {
    url: String,
    text: String,
}

// Extracts every http(s) link and image of a document
pub fn extract_occurrences(document: &Document) -> Vec<LinkOccurrence> {
    references(&document.content)
        .into_iter()
        .filter(|reference| is_external(&reference.url))
        .map(|reference| LinkOccurrence::new(reference.url, &document.id, reference.anchor))
        .collect()
}

// Extracts every link and image of a document, relative ones included
//
// Empty destinations and in-page fragments ("#usage") are skipped.
pub fn extract_references(document: &Document) -> Vec<Reference> {
    references(&document.content)
        .into_iter()
        .filter(|reference| !reference.url.is_empty() && !reference.url.starts_with('#'))
        .collect()
}

/// True for absolute http:// and https:// destinations
pub fn is_external(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

// All link and image destinations, in document order
//
// A link is recorded when it closes, so an image nested in a link (a
// badge) comes right before it.
fn references(markdown: &str) -> Vec<Reference> {
    let mut references = Vec::new();

    // Links can't nest in CommonMark, but images can sit inside links
    let mut open_link: Option<OpenLink> = None;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Link(_link_type, dest_url, _title)) => {
                open_link = Some(OpenLink {
                    url: dest_url.to_string(),
                    text: String::new(),
                });
            }

            Event::End(Tag::Link(..)) => {
                if let Some(link) = open_link.take() {
                    references.push(Reference {
                        anchor: link.text.trim().to_string(),
                        url: link.url,
                    });
                }
            }

            Event::Start(Tag::Image(_link_type, dest_url, _title)) => {
                references.push(Reference {
                    url: dest_url.to_string(),
                    anchor: IMAGE_ANCHOR.to_string(),
                });
            }

            // Link text, including inline code and image alt text
            Event::Text(text) | Event::Code(text) => {
                if let Some(link) = open_link.as_mut() {
                    link.text.push_str(&text);
                }
            }

            Event::SoftBreak | Event::HardBreak => {
                if let Some(link) = open_link.as_mut() {
                    link.text.push(' ');
                }
            }

            _ => {}
        }
    }

    references
}

// Info strings of the fenced code blocks, in order; "" for untagged ones
pub fn fence_tags(markdown: &str) -> Vec<String> {
    Parser::new(markdown)
        .filter_map(|event| match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => Some(info.trim().to_string()),
            _ => None,
        })
        .collect()
}

// Returns the text of the first level-1 heading, or UNTITLED
pub fn extract_title(markdown: &str) -> String {
    let mut in_title = false;
    let mut title = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading(HeadingLevel::H1, ..)) => in_title = true,
            Event::End(Tag::Heading(HeadingLevel::H1, ..)) => {
                let title = title.trim();
                if !title.is_empty() {
                    return title.to_string();
                }
                in_title = false;
            }
            Event::Text(text) | Event::Code(text) if in_title => title.push_str(&text),
            _ => {}
        }
    }

    UNTITLED.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str) -> Document {
        Document::new("README.md", content)
    }

    fn pairs(content: &str) -> Vec<(String, String)> {
        extract_occurrences(&doc(content))
            .into_iter()
            .map(|o| (o.url, o.anchor_text))
            .collect()
    }

    #[test]
    fn test_extract_simple_link() {
        let links = pairs("Check out [Rust](https://www.rust-lang.org)!");
        assert_eq!(
            links,
            vec![("https://www.rust-lang.org".to_string(), "Rust".to_string())]
        );
    }

    #[test]
    fn test_extract_image() {
        let links = pairs("![logo](https://example.com/logo.png)");
        assert_eq!(
            links,
            vec![("https://example.com/logo.png".to_string(), IMAGE_ANCHOR.to_string())]
        );
    }

    #[test]
    fn test_occurrence_carries_document_id() {
        let occurrences = extract_occurrences(&Document::new("docs/guide.md", "[a](https://a.example)"));
        assert_eq!(occurrences[0].document_id, "docs/guide.md");
    }

    #[test]
    fn test_extract_multiple_links_in_order() {
        let markdown = r#"
# Resources

- [Rust](https://www.rust-lang.org)
- [Cargo `book`](https://doc.rust-lang.org/cargo/)
- [Rust again](https://www.rust-lang.org)
        "#;
        let links = pairs(markdown);
        let anchors: Vec<_> = links.iter().map(|(_, text)| text.as_str()).collect();
        assert_eq!(anchors, vec!["Rust", "Cargo book", "Rust again"]);
    }

    #[test]
    fn test_reference_links() {
        let markdown = "See [the docs][docs].\n\n[docs]: https://docs.example/";
        assert_eq!(
            pairs(markdown),
            vec![("https://docs.example/".to_string(), "the docs".to_string())]
        );
    }

    #[test]
    fn test_badge_yields_image_and_link() {
        let markdown = "[![build](https://ci.example/badge.svg)](https://ci.example/)";
        let links = pairs(markdown);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].1, IMAGE_ANCHOR);
        assert_eq!(links[1].0, "https://ci.example/");
    }

    #[test]
    fn test_skip_non_web_links() {
        let markdown = "[email](mailto:test@example.com) [docs](./docs/README.md) ![x](img/local.png)";
        assert!(pairs(markdown).is_empty());
    }

    #[test]
    fn test_references_keep_relative_links() {
        let document = doc("[guide](./guide.md) [top](#top) [site](https://a.example) ![x](img/a.png) [mail](mailto:a@b.example)");
        let urls: Vec<_> = extract_references(&document).into_iter().map(|r| r.url).collect();

        assert_eq!(urls, vec!["./guide.md", "https://a.example", "img/a.png", "mailto:a@b.example"]);
    }

    #[test]
    fn test_is_external() {
        assert!(is_external("https://a.example"));
        assert!(is_external("http://a.example"));
        assert!(!is_external("./http.md"));
        assert!(!is_external("mailto:a@b.example"));
    }

    #[test]
    fn test_fence_tags() {
        let markdown = "```rust\nfn main() {}\n```\n\n```\nplain\n```\n\n    indented\n\n~~~ bash \nls\n~~~\n";
        assert_eq!(fence_tags(markdown), vec!["rust", "", "bash"]);
    }

    #[test]
    fn test_title() {
        assert_eq!(extract_title("intro\n\n# My *Project*\n\n# Second"), "My Project");
        assert_eq!(extract_title("## Only a subheading"), UNTITLED);
    }
}
