/// Known project-name fragments, each tied to the knowledge-base collection
/// it maps to. Matching is case-insensitive substring match against the full
/// repository identifier.
const KNOWN_FRAGMENTS: &[(&str, &str)] = &[
    ("user_income", "user_income"),
    ("user_occupation", "user_occupation"),
    ("dge", "dge"),
    ("genie", "genie"),
    ("pills", "pills"),
    ("ride", "ride"),
    ("pn", "pn_push_notifications"),
];

/// One keyword candidate derived from a repository identifier, carrying the
/// knowledge-base collection the fragment belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordCandidate {
    pub keyword: String,
    pub collection: String,
}

/// Derive keyword candidates from a repository identifier.
///
/// Pure and deterministic: the fragment table is scanned in a fixed order and
/// every case-insensitive substring match produces one candidate. When no
/// known fragment matches, the last `/`-separated path segment of the
/// identifier is used verbatim, mapped to a collection of the same name.
pub fn extract_keywords(identifier: &str) -> Vec<KeywordCandidate> {
    let lowered = identifier.to_lowercase();

    let matched: Vec<KeywordCandidate> = KNOWN_FRAGMENTS
        .iter()
        .filter(|(fragment, _)| lowered.contains(fragment))
        .map(|(fragment, collection)| KeywordCandidate {
            keyword: (*fragment).to_string(),
            collection: (*collection).to_string(),
        })
        .collect();

    if !matched.is_empty() {
        return matched;
    }

    let fallback = identifier
        .rsplit('/')
        .next()
        .unwrap_or(identifier)
        .to_string();
    vec![KeywordCandidate {
        collection: fallback.clone(),
        keyword: fallback,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(identifier: &str) -> Vec<String> {
        extract_keywords(identifier)
            .into_iter()
            .map(|c| c.keyword)
            .collect()
    }

    #[test]
    fn matches_single_known_fragment() {
        assert!(keywords("gopay-genie-model_pipeline-production").contains(&"genie".to_string()));
    }

    #[test]
    fn matches_multiple_fragments() {
        let found = keywords("gopay-dge-ride-model_pipeline-staging");
        assert!(found.contains(&"dge".to_string()));
        assert!(found.contains(&"ride".to_string()));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(keywords("team/GENIE-serving").contains(&"genie".to_string()));
    }

    #[test]
    fn unmatched_identifier_falls_back_to_last_segment() {
        assert_eq!(keywords("octo/demo"), vec!["demo".to_string()]);
        assert_eq!(keywords("standalone-project"), vec!["standalone-project".to_string()]);
    }

    #[test]
    fn extraction_is_deterministic() {
        let a = extract_keywords("gopay-dge-ride-model_pipeline-staging");
        let b = extract_keywords("gopay-dge-ride-model_pipeline-staging");
        assert_eq!(a, b);
    }

    #[test]
    fn pn_maps_to_push_notifications_collection() {
        let candidates = extract_keywords("gopay-pn-batcher");
        let pn = candidates.iter().find(|c| c.keyword == "pn").unwrap();
        assert_eq!(pn.collection, "pn_push_notifications");
    }
}
