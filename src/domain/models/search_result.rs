use serde::{Deserialize, Serialize};

/// Where a reference-documentation result came from. The label is shown in
/// the output so readers can tell sources apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultOrigin {
    Drive,
    /// Knowledge-base hit, labeled with the collection it came from.
    KnowledgeBase(String),
}

impl ResultOrigin {
    pub fn label(&self) -> String {
        match self {
            ResultOrigin::Drive => "drive".to_string(),
            ResultOrigin::KnowledgeBase(collection) => format!("kb/{collection}"),
        }
    }
}

/// One reference-documentation hit from an optional source.
///
/// `html_url` is a user-clickable viewer link; raw internal document URIs
/// never leave the connector that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    origin: ResultOrigin,
    title: String,
    snippet: String,
    html_url: Option<String>,
    score: Option<f32>,
}

impl SearchResult {
    pub fn drive(title: String, snippet: String, html_url: String) -> Self {
        Self {
            origin: ResultOrigin::Drive,
            title,
            snippet,
            html_url: Some(html_url),
            score: None,
        }
    }

    pub fn knowledge_base(collection: String, title: String, snippet: String, score: f32) -> Self {
        Self {
            origin: ResultOrigin::KnowledgeBase(collection),
            title,
            snippet,
            html_url: None,
            score: Some(score),
        }
    }

    pub fn origin(&self) -> &ResultOrigin {
        &self.origin
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn snippet(&self) -> &str {
        &self.snippet
    }

    pub fn html_url(&self) -> Option<&str> {
        self.html_url.as_deref()
    }

    pub fn score(&self) -> Option<f32> {
        self.score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_labels() {
        assert_eq!(ResultOrigin::Drive.label(), "drive");
        assert_eq!(
            ResultOrigin::KnowledgeBase("genie".to_string()).label(),
            "kb/genie"
        );
    }

    #[test]
    fn kb_results_carry_score_and_collection() {
        let result = SearchResult::knowledge_base(
            "dge".to_string(),
            "dge".to_string(),
            "ranking pipeline notes".to_string(),
            0.87,
        );
        assert_eq!(result.score(), Some(0.87));
        assert!(result.html_url().is_none());
        assert_eq!(result.origin().label(), "kb/dge");
    }
}
