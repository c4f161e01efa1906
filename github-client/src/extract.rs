use issuewatch_core::{CoreError, Issue};
use regex::Regex;
use std::sync::OnceLock;
use tracing::info;
use url::Url;

// Anchors one issue row on the listing page. Rows that do not carry this exact
// id/class/href shape are skipped.
const ISSUE_LINK_PATTERN: &str = r#"<a id="issue_(\d+)_link" class="Link--primary v-align-middle no-underline h4 js-navigation-open markdown-title" [^>]*href="([^"]+)"[^>]*>([^<]+)</a>"#;

fn issue_link_regex() -> Result<&'static Regex, CoreError> {
    static ISSUE_LINK: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

    ISSUE_LINK
        .get_or_init(|| Regex::new(ISSUE_LINK_PATTERN))
        .as_ref()
        .map_err(|e| CoreError::Internal {
            message: format!("issue link pattern failed to compile: {e}"),
        })
}

/// Turns listing markup into [`Issue`]s, prefixing hrefs with the source host.
#[derive(Debug, Clone)]
pub struct IssueExtractor {
    source_host: String,
}

impl IssueExtractor {
    pub fn new(source_host: &str) -> Result<Self, CoreError> {
        let source_host = source_host.trim();
        Url::parse(source_host)?;

        Ok(Self {
            source_host: source_host.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the issues in document order.
    pub fn extract(&self, html: &str) -> Result<Vec<Issue>, CoreError> {
        let pattern = issue_link_regex()?;

        let issues: Vec<Issue> = pattern
            .captures_iter(html)
            .map(|captures| {
                let (_, [id, href, title]) = captures.extract();
                Issue {
                    id: id.to_string(),
                    url: format!("{}{}", self.source_host, href),
                    title: title.trim().to_string(),
                }
            })
            .collect();

        info!("Found {} matches", issues.len());
        Ok(issues)
    }
}
