use serde::{Deserialize, Serialize};

/// Metadata for one hosted repository, fetched at the start of a run and
/// discarded when the run completes. Fields mirror what the upstream API
/// exposes; `html_url` is always a fully-qualified browsable link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    full_name: String,
    name: String,
    description: Option<String>,
    default_branch: String,
    visibility: String,
    license: Option<String>,
    language: Option<String>,
    topics: Vec<String>,
    stargazers_count: u64,
    forks_count: u64,
    open_issues_count: u64,
    html_url: String,
    pushed_at: Option<String>,
}

impl RepositoryDescriptor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        full_name: String,
        name: String,
        description: Option<String>,
        default_branch: String,
        visibility: String,
        license: Option<String>,
        language: Option<String>,
        topics: Vec<String>,
        stargazers_count: u64,
        forks_count: u64,
        open_issues_count: u64,
        html_url: String,
        pushed_at: Option<String>,
    ) -> Self {
        Self {
            full_name,
            name,
            description,
            default_branch,
            visibility,
            license,
            language,
            topics,
            stargazers_count,
            forks_count,
            open_issues_count,
            html_url,
            pushed_at,
        }
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    pub fn visibility(&self) -> &str {
        &self.visibility
    }

    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn stargazers_count(&self) -> u64 {
        self.stargazers_count
    }

    pub fn forks_count(&self) -> u64 {
        self.forks_count
    }

    pub fn open_issues_count(&self) -> u64 {
        self.open_issues_count
    }

    pub fn html_url(&self) -> &str {
        &self.html_url
    }

    pub fn pushed_at(&self) -> Option<&str> {
        self.pushed_at.as_deref()
    }

    pub fn summary(&self) -> String {
        match self.description() {
            Some(desc) => format!("{}: {}", self.full_name, desc),
            None => self.full_name.clone(),
        }
    }
}

/// Validate a repository identifier in `owner/repo` form.
///
/// Owner and repo segments may contain alphanumerics, hyphens, and
/// underscores (plus dots in the repo segment); neither may start with a
/// punctuation character.
pub fn validate_identifier(identifier: &str) -> bool {
    let mut parts = identifier.splitn(2, '/');
    let (Some(owner), Some(repo)) = (parts.next(), parts.next()) else {
        return false;
    };

    fn leading_alnum(s: &str) -> bool {
        s.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
    }

    leading_alnum(owner)
        && owner
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        && leading_alnum(repo)
        && repo
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// Replace characters that are invalid in filenames with underscores.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_identifiers() {
        assert!(validate_identifier("octo/demo"));
        assert!(validate_identifier("my-org/my_repo.v2"));
    }

    #[test]
    fn invalid_identifiers() {
        assert!(!validate_identifier("octo"));
        assert!(!validate_identifier(""));
        assert!(!validate_identifier("-octo/demo"));
        assert!(!validate_identifier("octo/.demo"));
        assert!(!validate_identifier("octo/demo/extra"));
    }

    #[test]
    fn sanitize_replaces_separators() {
        assert_eq!(sanitize_filename("octo/demo"), "octo_demo");
        assert_eq!(sanitize_filename("a:b?c"), "a_b_c");
    }

    #[test]
    fn descriptor_summary_includes_description() {
        let desc = RepositoryDescriptor::new(
            "octo/demo".to_string(),
            "demo".to_string(),
            Some("A demo".to_string()),
            "main".to_string(),
            "public".to_string(),
            Some("MIT".to_string()),
            None,
            vec![],
            1,
            0,
            0,
            "https://github.com/octo/demo".to_string(),
            None,
        );
        assert_eq!(desc.summary(), "octo/demo: A demo");
        assert!(desc.html_url().contains("octo/demo"));
    }
}
