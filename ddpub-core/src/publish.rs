//! Which notes get published, and in which role.

use crate::config::{Homepage, WebsiteConfig};
use crate::tags::TagIndex;
use ddpub_types::NoteId;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublishRole {
    /// Content of a builtin page: the homepage or the feed page.
    Builtin,
    /// Carries the feed tag.
    Feed,
    /// Carries the pages tag.
    Page,
    /// Bound to a configured tag's page.
    TagContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublishTarget {
    pub id: NoteId,
    pub role: PublishRole,
}

impl PublishTarget {
    fn new(id: NoteId, role: PublishRole) -> Self {
        Self { id, role }
    }
}

/// List publish targets in precedence order. The same id may appear with
/// several roles.
pub fn classify(config: &WebsiteConfig, index: &TagIndex) -> Vec<PublishTarget> {
    let mut targets = Vec::new();

    if let Homepage::Note(id) = &config.homepage {
        targets.push(PublishTarget::new(id.clone(), PublishRole::Builtin));
    }

    if let Some(id) = &config.feed.id {
        targets.push(PublishTarget::new(id.clone(), PublishRole::Builtin));
    }

    for tag in &config.tags {
        if let Some(id) = &tag.id {
            targets.push(PublishTarget::new(id.clone(), PublishRole::TagContent));
        }
    }

    if let Some(pages_tag) = &config.pages.tag {
        for id in index.notes(pages_tag) {
            targets.push(PublishTarget::new(id.clone(), PublishRole::Page));
        }
    }

    for id in index.notes(&config.feed.tag) {
        targets.push(PublishTarget::new(id.clone(), PublishRole::Feed));
    }

    tracing::debug!("Classified {} publish targets", targets.len());
    targets
}

/// Distinct ids of `targets` in order of first appearance.
pub fn distinct_ids(targets: &[PublishTarget]) -> Vec<&NoteId> {
    let mut seen = HashSet::new();
    targets
        .iter()
        .map(|t| &t.id)
        .filter(|id| seen.insert(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::MINIMAL;
    use crate::scanner::tests::metadata as note;
    use crate::scanner::Notes;

    #[test]
    fn test_classification_order() {
        let yaml = format!(
            r#"{MINIMAL}homepage:
  id: "100000000001"
pages:
  tag: page
tags:
  - tag: rust
    id: "100000000002"
"#
        )
        .replace("tag: blog", "tag: blog\n  id: \"100000000003\"");
        let config = WebsiteConfig::from_yaml(&yaml).unwrap();

        let notes: Notes = vec![
            note("100000000004", 0, &["page", "blog"]),
            note("100000000005", 1, &["blog"]),
        ]
        .into_iter()
        .collect();
        let index = TagIndex::build(&notes);

        let targets = classify(&config, &index);
        let summary: Vec<(&str, PublishRole)> =
            targets.iter().map(|t| (t.id.as_str(), t.role)).collect();
        assert_eq!(
            summary,
            vec![
                ("100000000001", PublishRole::Builtin),
                ("100000000003", PublishRole::Builtin),
                ("100000000002", PublishRole::TagContent),
                ("100000000004", PublishRole::Page),
                ("100000000004", PublishRole::Feed),
                ("100000000005", PublishRole::Feed),
            ]
        );

        let ids: Vec<&str> = distinct_ids(&targets).iter().map(|id| id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "100000000001",
                "100000000003",
                "100000000002",
                "100000000004",
                "100000000005"
            ]
        );
    }

    #[test]
    fn test_feed_homepage_has_no_builtin_target() {
        let config = WebsiteConfig::from_yaml(MINIMAL).unwrap();
        let targets = classify(&config, &TagIndex::default());
        assert!(targets.is_empty());
    }
}
