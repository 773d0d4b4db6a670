use serde::{Deserialize, Serialize};

/// Marker appended when a file's content was cut at the line or byte cap.
pub const TRUNCATION_MARKER: &str = "... (truncated)";

/// An extracted piece of source text plus a clickable reference URL.
/// Exists only while a document or answer is being assembled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSnippet {
    path: String,
    text: String,
    line_count: usize,
    truncated: bool,
    html_url: String,
}

impl CodeSnippet {
    /// Build a snippet from full file content, truncating to `max_lines`
    /// with [`TRUNCATION_MARKER`] appended when the cap is exceeded.
    pub fn from_content(path: String, content: &str, max_lines: usize, html_url: String) -> Self {
        let total_lines = content.lines().count();
        let truncated = total_lines > max_lines;
        let text = if truncated {
            let mut kept: String = content
                .lines()
                .take(max_lines)
                .collect::<Vec<_>>()
                .join("\n");
            kept.push('\n');
            kept.push_str(TRUNCATION_MARKER);
            kept
        } else {
            content.to_string()
        };

        Self {
            path,
            text,
            line_count: total_lines.min(max_lines),
            truncated,
            html_url,
        }
    }

    /// Build a snippet capped at `max_bytes` of content, used for the short
    /// entry-point previews in the learning path.
    pub fn from_prefix(path: String, content: &str, max_bytes: usize, html_url: String) -> Self {
        let truncated = content.len() > max_bytes;
        let text = if truncated {
            let mut end = max_bytes;
            while !content.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}\n{}", &content[..end], TRUNCATION_MARKER)
        } else {
            content.to_string()
        };
        let line_count = text.lines().count();

        Self {
            path,
            text,
            line_count,
            truncated,
            html_url,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn html_url(&self) -> &str {
        &self.html_url
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_kept_verbatim() {
        let snippet = CodeSnippet::from_content(
            "src/main.rs".to_string(),
            "fn main() {}\n",
            1000,
            "https://github.com/octo/demo/blob/main/src/main.rs".to_string(),
        );
        assert!(!snippet.is_truncated());
        assert_eq!(snippet.text(), "fn main() {}\n");
    }

    #[test]
    fn long_content_is_truncated_with_marker() {
        let content: String = (0..1500).map(|i| format!("line {i}\n")).collect();
        let snippet = CodeSnippet::from_content(
            "src/big.rs".to_string(),
            &content,
            1000,
            "https://example.com".to_string(),
        );
        assert!(snippet.is_truncated());
        assert_eq!(snippet.line_count(), 1000);
        assert!(snippet.text().ends_with(TRUNCATION_MARKER));
        assert!(!snippet.text().contains("line 1000\n"));
    }

    #[test]
    fn prefix_truncation_respects_char_boundaries() {
        let snippet = CodeSnippet::from_prefix(
            "notes.md".to_string(),
            "héllo wörld, this is longer than the cap",
            10,
            "https://example.com".to_string(),
        );
        assert!(snippet.is_truncated());
        assert!(snippet.text().ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn file_name_strips_directories() {
        let snippet = CodeSnippet::from_content(
            "src/nested/main.py".to_string(),
            "pass",
            10,
            String::new(),
        );
        assert_eq!(snippet.file_name(), "main.py");
    }
}
