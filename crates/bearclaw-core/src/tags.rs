//! Hashtag extraction from note text.
//!
//! Bear has no tags table; a tag exists wherever `#name` appears in a note
//! body. Extraction here mirrors what Bear renders: `#` followed by one or
//! more characters that are neither whitespace nor another `#`. Nested tags
//! (`#work/project`) come through as a single tag because `/` is not a
//! terminator, and a Markdown heading (`# Title`) is not a tag because the
//! space ends the match immediately.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#([^#\s]+)").unwrap());

/// A hashtag together with the number of times it occurs across the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub note_count: usize,
}

/// Extracts every `#hashtag` occurrence from note text, in document order.
///
/// Repeated tags are kept; callers that need distinct names deduplicate
/// themselves.
pub fn extract_tags(content: &str) -> Vec<String> {
    TAG_RE
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Strips one leading `#` so user input compares equal to extracted names.
pub fn normalize_tag(tag: &str) -> &str {
    tag.strip_prefix('#').unwrap_or(tag)
}

/// Tallies tag occurrences across many note texts.
///
/// Tags are returned sorted by occurrence count descending; ties keep the
/// order in which each tag was first seen, so output is deterministic for a
/// given input order.
pub fn count_tags<'a, I>(texts: I) -> Vec<Tag>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut first_seen = 0;
    for text in texts {
        for name in extract_tags(text) {
            let entry = counts.entry(name).or_insert_with(|| {
                let rank = first_seen;
                first_seen += 1;
                (rank, 0)
            });
            entry.1 += 1;
        }
    }

    let mut ranked: Vec<(usize, Tag)> = counts
        .into_iter()
        .map(|(name, (rank, count))| {
            (
                rank,
                Tag {
                    name,
                    note_count: count,
                },
            )
        })
        .collect();
    ranked.sort_by(|a, b| b.1.note_count.cmp(&a.1.note_count).then(a.0.cmp(&b.0)));
    ranked.into_iter().map(|(_, tag)| tag).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_tags_basic() {
        let tags = extract_tags("Meeting notes #work and #planning for today");
        assert_eq!(tags, vec!["work", "planning"]);
    }

    #[test]
    fn test_extract_tags_nested() {
        let tags = extract_tags("#work/project-alpha is on track");
        assert_eq!(tags, vec!["work/project-alpha"]);
    }

    #[test]
    fn test_extract_tags_keeps_punctuation() {
        // Anything up to the next space or '#' belongs to the tag name.
        let tags = extract_tags("Buy milk #shopping and #todo-list!");
        assert_eq!(tags, vec!["shopping", "todo-list!"]);
    }

    #[test]
    fn test_extract_tags_keeps_duplicates() {
        let tags = extract_tags("#todo first thing, #todo second thing");
        assert_eq!(tags, vec!["todo", "todo"]);
    }

    #[test]
    fn test_markdown_heading_is_not_a_tag() {
        assert!(extract_tags("# Heading\n\nBody text").is_empty());
    }

    #[test]
    fn test_lone_and_double_hash() {
        assert!(extract_tags("just a # sign").is_empty());
        // In "##x" the first "#" cannot start a tag, the second can.
        assert_eq!(extract_tags("##x"), vec!["x"]);
    }

    #[test]
    fn test_extract_tags_empty_content() {
        assert!(extract_tags("").is_empty());
    }

    #[test]
    fn test_normalize_tag_strips_single_hash() {
        assert_eq!(normalize_tag("#work"), "work");
        assert_eq!(normalize_tag("work"), "work");
        assert_eq!(normalize_tag("##work"), "#work");
    }

    #[test]
    fn test_count_tags_orders_by_count() {
        let texts = ["#a #b", "#b note", "#b #c"];
        let tags = count_tags(texts);
        assert_eq!(tags[0], Tag { name: "b".into(), note_count: 3 });
        assert_eq!(tags[1], Tag { name: "a".into(), note_count: 1 });
        assert_eq!(tags[2], Tag { name: "c".into(), note_count: 1 });
    }

    #[test]
    fn test_count_tags_counts_occurrences_not_notes() {
        // The same tag twice in one note counts twice.
        let tags = count_tags(["#idea and again #idea"]);
        assert_eq!(tags, vec![Tag { name: "idea".into(), note_count: 2 }]);
    }

    #[test]
    fn test_count_tags_tie_break_is_first_seen() {
        let tags = count_tags(["#zebra #apple", "#mango"]);
        let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["zebra", "apple", "mango"]);
    }
}
