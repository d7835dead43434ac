// src/documents/github.rs
// =============================================================================
// This module fetches the README of a GitHub repository.
//
// Strategy:
// - Parse the GitHub URL to extract owner and repo name
// - Fetch README.md from raw.githubusercontent.com, which serves raw file
//   contents without needing the API (or a token)
// - Try the `main` branch first, then `master`
//
// Rust concepts:
// - async functions: For network I/O
// - anyhow::Result + Context: For readable error chains
// =============================================================================

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use tracing::{debug, warn};

use super::Document;

const RAW_CONTENT_BASE: &str = "https://raw.githubusercontent.com";
const BRANCHES: [&str; 2] = ["main", "master"];

// Fetches README.md of a GitHub repository as a single Document
//
// Parameters:
//   repo_url: GitHub repository URL (e.g., "https://github.com/rust-lang/rust")
//
// Returns: the README, or an error if no branch has one
pub async fn fetch_repo_readme(repo_url: &str) -> Result<Vec<Document>> {
    let (owner, repo) = parse_github_url(repo_url)?;
    let client = Client::new();

    fetch_readme_from(&client, RAW_CONTENT_BASE, &owner, &repo).await
}

async fn fetch_readme_from(
    client: &Client,
    raw_base: &str,
    owner: &str,
    repo: &str,
) -> Result<Vec<Document>> {
    for branch in BRANCHES {
        let readme_url = format!("{}/{}/{}/{}/README.md", raw_base, owner, repo, branch);
        debug!(url = %readme_url, "fetching README");

        match fetch_file(client, &readme_url).await {
            Ok(content) => return Ok(vec![Document::new("README.md", content)]),
            Err(e) => warn!(branch, "Could not fetch README.md: {}", e),
        }
    }

    bail!(
        "No README.md found for {}/{} on branches {}",
        owner,
        repo,
        BRANCHES.join(", ")
    )
}

// Parses a GitHub URL to extract owner and repository name
//
// Supported formats:
//   - https://github.com/owner/repo
//   - https://github.com/owner/repo.git
//   - github.com/owner/repo
//
// Example:
//   "https://github.com/rust-lang/rust" -> ("rust-lang", "rust")
fn parse_github_url(url: &str) -> Result<(String, String)> {
    let path = url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.")
        .strip_prefix("github.com/")
        .ok_or_else(|| anyhow!("Not a GitHub URL: {}", url))?;

    let mut parts = path.split('/').filter(|part| !part.is_empty());
    let (owner, repo) = match (parts.next(), parts.next()) {
        (Some(owner), Some(repo)) => (owner, repo),
        _ => bail!("Invalid GitHub URL format: {}", url),
    };

    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    Ok((owner.to_string(), repo.to_string()))
}

async fn fetch_file(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;

    if !response.status().is_success() {
        bail!("Failed to fetch {}: HTTP {}", url, response.status());
    }

    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_github_url() {
        let (owner, repo) = parse_github_url("https://github.com/rust-lang/rust").unwrap();
        assert_eq!(owner, "rust-lang");
        assert_eq!(repo, "rust");
    }

    #[test]
    fn test_parse_github_url_with_git() {
        let (owner, repo) = parse_github_url("https://github.com/user/repo.git").unwrap();
        assert_eq!(owner, "user");
        assert_eq!(repo, "repo");
    }

    #[test]
    fn test_parse_invalid_url() {
        assert!(parse_github_url("https://gitlab.com/user/repo").is_err());
        assert!(parse_github_url("https://github.com/only-owner").is_err());
    }

    #[tokio::test]
    async fn test_falls_back_to_master() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/repo/master/README.md"))
            .respond_with(ResponseTemplate::new(200).set_body_string("# Repo\n[docs](https://docs.example)"))
            .mount(&server)
            .await;

        let documents = fetch_readme_from(&Client::new(), &server.uri(), "user", "repo").await?;

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id, "README.md");
        assert_eq!(documents[0].title, "Repo");
        Ok(())
    }

    #[tokio::test]
    async fn test_no_readme_is_an_error() {
        let server = MockServer::start().await;

        let result = fetch_readme_from(&Client::new(), &server.uri(), "user", "repo").await;

        assert!(result.is_err());
    }
}
