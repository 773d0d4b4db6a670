use serde::{Deserialize, Serialize};

/// A single commit as shown in the "Recent Contributors" section:
/// short SHA, first line of the message, author, date, and a browsable URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitSummary {
    sha: String,
    title: String,
    author_name: String,
    author_date: String,
    html_url: String,
}

impl CommitSummary {
    pub fn new(
        sha: String,
        message: &str,
        author_name: String,
        author_date: String,
        html_url: String,
    ) -> Self {
        let short = sha.chars().take(7).collect();
        let title = message.lines().next().unwrap_or_default().to_string();
        Self {
            sha: short,
            title,
            author_name,
            author_date,
            html_url,
        }
    }

    pub fn sha(&self) -> &str {
        &self.sha
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    pub fn author_date(&self) -> &str {
        &self.author_date
    }

    pub fn html_url(&self) -> &str {
        &self.html_url
    }
}
