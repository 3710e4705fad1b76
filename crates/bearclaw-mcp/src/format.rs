//! Markdown rendering for tool responses.
//!
//! Responses are plain Markdown text: an AI assistant reads them directly,
//! so layout favors short labeled lines over tables. Previews flatten
//! newlines and truncate on character boundaries, never mid-codepoint.

use bearclaw_core::{Note, SortField, Tag};
use bearclaw_sqlite::NoteStatistics;
use chrono::{DateTime, SecondsFormat, Utc};

/// RFC 3339 with milliseconds, always UTC.
pub fn fmt_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// First `max` characters of the body with newlines flattened to spaces
/// and `...` appended when anything was cut.
pub fn preview(content: &str, max: usize) -> String {
    let flat = content.replace('\n', " ");
    let cut: String = flat.chars().take(max).collect();
    let mut out = cut.trim().to_string();
    if flat.chars().count() > max {
        out.push_str("...");
    }
    out
}

/// `#a, #b` or `None` for untagged notes.
pub fn tags_line(tags: &[String]) -> String {
    if tags.is_empty() {
        "None".to_string()
    } else {
        tags.iter()
            .map(|tag| format!("#{tag}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn field_label(field: SortField) -> &'static str {
    match field {
        SortField::Created => "Created",
        SortField::Modified => "Modified",
    }
}

/// Full note body plus a metadata footer.
pub fn note_details(note: &Note) -> String {
    format!(
        "# {}\n\n{}\n\n---\n**Tags:** {}\n**Created:** {}\n**Modified:** {}\n**ID:** {}",
        note.title,
        note.content,
        tags_line(&note.tags),
        fmt_date(note.creation_date),
        fmt_date(note.modification_date),
        note.id
    )
}

/// Search hits with 150-character previews. `scope` finishes the sentence
/// in the header, e.g. `matching "milk"`.
pub fn search_results(notes: &[Note], scope: &str) -> String {
    let entries = notes
        .iter()
        .map(|note| {
            format!(
                "## {}\n{}\n**Tags:** {}\n**Modified:** {}\n**ID:** {}",
                note.title,
                preview(&note.content, 150),
                tags_line(&note.tags),
                fmt_date(note.modification_date),
                note.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("Found {} note(s) {scope}:\n\n{entries}", notes.len())
}

/// Tags grouped into frequency buckets; empty buckets are omitted.
pub fn tag_overview(tags: &[Tag]) -> String {
    let mut out = format!("Found {} unique tag(s) in your Bear notes:\n", tags.len());

    let sections: [(&str, &dyn Fn(usize) -> bool); 3] = [
        ("### Most Used Tags (10+ notes)", &|n| n >= 10),
        ("### Frequently Used Tags (5-9 notes)", &|n| (5..10).contains(&n)),
        ("### Occasional Tags (2-4 notes)", &|n| (2..5).contains(&n)),
    ];
    for (header, belongs) in sections {
        let bucket: Vec<&Tag> = tags.iter().filter(|t| belongs(t.note_count)).collect();
        if !bucket.is_empty() {
            out.push_str(&format!("\n{header}\n"));
            for tag in bucket {
                out.push_str(&format!("- #{} ({} notes)\n", tag.name, tag.note_count));
            }
        }
    }

    let rare: Vec<String> = tags
        .iter()
        .filter(|t| t.note_count == 1)
        .map(|t| format!("#{}", t.name))
        .collect();
    if !rare.is_empty() {
        out.push_str("\n### Rare Tags (1 note)\n");
        out.push_str(&rare.join(", "));
        out.push('\n');
    }

    out
}

/// Notes carrying `#tag`, with any other tags each note has listed too.
pub fn notes_with_tag(tag: &str, notes: &[Note]) -> String {
    let entries = notes
        .iter()
        .map(|note| {
            let mut entry = format!("## {}\n{}\n", note.title, preview(&note.content, 200));
            let others: Vec<String> = note
                .tags
                .iter()
                .filter(|name| name.as_str() != tag)
                .map(|name| format!("#{name}"))
                .collect();
            if !others.is_empty() {
                entry.push_str(&format!("**Other tags:** {}\n", others.join(", ")));
            }
            entry.push_str(&format!(
                "**Modified:** {}\n**ID:** {}",
                fmt_date(note.modification_date),
                note.id
            ));
            entry
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "# Notes tagged with #{tag}\n\nFound {} note(s):\n\n{entries}",
        notes.len()
    )
}

/// Numbered recency list with a pin marker on pinned notes.
pub fn recent_list(notes: &[Note]) -> String {
    let entries = notes
        .iter()
        .enumerate()
        .map(|(i, note)| {
            let mut entry = format!(
                "{}. **{}**\n   Modified: {}\n   Tags: {}\n   Preview: {}",
                i + 1,
                note.title,
                fmt_date(note.modification_date),
                tags_line(&note.tags),
                preview(&note.content, 100)
            );
            if note.is_pinned {
                entry.push_str("\n   📌 Pinned");
            }
            entry
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("# Recent Notes ({})\n\n{entries}", notes.len())
}

pub fn pinned_list(notes: &[Note]) -> String {
    let entries = notes
        .iter()
        .enumerate()
        .map(|(i, note)| {
            format!(
                "{}. **{}** 📌\n   Created: {}\n   Modified: {}\n   Tags: {}\n   Preview: {}",
                i + 1,
                note.title,
                fmt_date(note.creation_date),
                fmt_date(note.modification_date),
                tags_line(&note.tags),
                preview(&note.content, 150)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("# Pinned Notes ({})\n\n{entries}", notes.len())
}

/// Date-window hits showing whichever timestamp the filter used. `start`
/// and `end` are echoed as the caller wrote them.
pub fn date_range_list(notes: &[Note], field: SortField, start: &str, end: &str) -> String {
    let label = field_label(field);
    let entries = notes
        .iter()
        .enumerate()
        .map(|(i, note)| {
            let date = match field {
                SortField::Created => note.creation_date,
                SortField::Modified => note.modification_date,
            };
            format!(
                "{}. **{}**\n   {label}: {}\n   Tags: {}\n   Preview: {}",
                i + 1,
                note.title,
                fmt_date(date),
                tags_line(&note.tags),
                preview(&note.content, 100)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "# Notes {label} Between {start} and {end}\n\nFound {} note(s)\n\n{entries}",
        notes.len()
    )
}

/// The full statistics report. The average is rounded here, at render
/// time, so the underlying value stays exact.
pub fn stats_report(stats: &NoteStatistics) -> String {
    let mut out = String::from("# Bear Notes Statistics\n\n");

    out.push_str("## Overview\n");
    out.push_str(&format!("- **Total Notes:** {}\n", stats.total_notes));
    out.push_str(&format!("- **Pinned Notes:** {}\n", stats.pinned_notes));
    out.push_str(&format!("- **Notes with Tags:** {}\n", stats.notes_with_tags));
    out.push_str(&format!("- **Total Unique Tags:** {}\n", stats.unique_tags));
    out.push_str(&format!(
        "- **Average Note Length:** {} characters\n",
        stats.average_note_length.round() as i64
    ));

    out.push_str("\n## Activity\n");
    out.push_str(&format!(
        "- **Notes Created This Week:** {}\n",
        stats.created_this_week
    ));
    out.push_str(&format!(
        "- **Notes Modified This Week:** {}\n",
        stats.modified_this_week
    ));
    out.push_str(&format!(
        "- **Notes Created This Month:** {}\n",
        stats.created_this_month
    ));
    out.push_str(&format!(
        "- **Notes Modified This Month:** {}\n",
        stats.modified_this_month
    ));

    out.push_str("\n## Top Tags\n");
    for (i, tag) in stats.top_tags.iter().enumerate() {
        out.push_str(&format!(
            "{}. **#{}** ({} notes)\n",
            i + 1,
            tag.name,
            tag.note_count
        ));
    }

    out.push_str("\n## Note Length Distribution\n");
    let dist = &stats.length_distribution;
    out.push_str(&format!("- **Very Short (<100 chars):** {}\n", dist.very_short));
    out.push_str(&format!("- **Short (100-500 chars):** {}\n", dist.short));
    out.push_str(&format!("- **Medium (500-2000 chars):** {}\n", dist.medium));
    out.push_str(&format!("- **Long (2000-5000 chars):** {}\n", dist.long));
    out.push_str(&format!("- **Very Long (>5000 chars):** {}\n", dist.very_long));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bearclaw_core::to_datetime;
    use bearclaw_sqlite::LengthDistribution;

    fn sample_note() -> Note {
        Note {
            id: "NOTE-1".to_string(),
            title: "Groceries".to_string(),
            content: "milk\neggs #shopping".to_string(),
            creation_date: to_datetime(700_000_000.0),
            modification_date: to_datetime(700_086_400.0),
            tags: vec!["shopping".to_string()],
            is_pinned: false,
            is_trashed: false,
        }
    }

    #[test]
    fn test_fmt_date_is_rfc3339_utc_millis() {
        assert_eq!(fmt_date(to_datetime(700_000_000.0)), "2023-03-08T20:26:40.000Z");
    }

    #[test]
    fn test_preview_flattens_and_truncates() {
        assert_eq!(preview("one\ntwo", 100), "one two");
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("abc", 3), "abc");
    }

    #[test]
    fn test_preview_trims_cut_edge() {
        // The cut lands on a space; no dangling whitespace before the dots.
        assert_eq!(preview("hello world", 6), "hello...");
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        assert_eq!(preview("🦀🐻🌲", 2), "🦀🐻...");
    }

    #[test]
    fn test_tags_line() {
        assert_eq!(tags_line(&[]), "None");
        assert_eq!(
            tags_line(&["a".to_string(), "b".to_string()]),
            "#a, #b"
        );
    }

    #[test]
    fn test_note_details_layout() {
        let text = note_details(&sample_note());
        assert!(text.starts_with("# Groceries\n\nmilk\neggs #shopping\n\n---\n"));
        assert!(text.contains("**Tags:** #shopping\n"));
        assert!(text.contains("**Created:** 2023-03-08T20:26:40.000Z\n"));
        assert!(text.ends_with("**ID:** NOTE-1"));
    }

    #[test]
    fn test_search_results_header_and_entries() {
        let notes = [sample_note()];
        let text = search_results(&notes, "matching \"milk\"");
        assert!(text.starts_with("Found 1 note(s) matching \"milk\":\n\n## Groceries\n"));
        assert!(text.contains("**ID:** NOTE-1"));
    }

    #[test]
    fn test_tag_overview_buckets() {
        let tags = vec![
            Tag { name: "daily".into(), note_count: 12 },
            Tag { name: "work".into(), note_count: 6 },
            Tag { name: "idea".into(), note_count: 3 },
            Tag { name: "once".into(), note_count: 1 },
            Tag { name: "misc".into(), note_count: 1 },
        ];
        let text = tag_overview(&tags);
        assert!(text.starts_with("Found 5 unique tag(s) in your Bear notes:\n"));
        assert!(text.contains("### Most Used Tags (10+ notes)\n- #daily (12 notes)\n"));
        assert!(text.contains("### Frequently Used Tags (5-9 notes)\n- #work (6 notes)\n"));
        assert!(text.contains("### Occasional Tags (2-4 notes)\n- #idea (3 notes)\n"));
        assert!(text.contains("### Rare Tags (1 note)\n#once, #misc\n"));
    }

    #[test]
    fn test_tag_overview_omits_empty_buckets() {
        let tags = vec![Tag { name: "solo".into(), note_count: 1 }];
        let text = tag_overview(&tags);
        assert!(!text.contains("Most Used"));
        assert!(!text.contains("Frequently Used"));
        assert!(text.contains("### Rare Tags (1 note)\n#solo\n"));
    }

    #[test]
    fn test_notes_with_tag_other_tags_line() {
        let mut note = sample_note();
        note.tags = vec!["shopping".to_string(), "errands".to_string()];
        let text = notes_with_tag("shopping", &[note.clone()]);
        assert!(text.starts_with("# Notes tagged with #shopping\n\nFound 1 note(s):\n"));
        assert!(text.contains("**Other tags:** #errands\n"));

        note.tags = vec!["shopping".to_string()];
        let text = notes_with_tag("shopping", &[note]);
        assert!(!text.contains("**Other tags:**"));
    }

    #[test]
    fn test_recent_list_marks_pinned() {
        let mut pinned = sample_note();
        pinned.is_pinned = true;
        let loose = sample_note();

        let text = recent_list(&[pinned, loose]);
        assert!(text.starts_with("# Recent Notes (2)\n"));
        assert!(text.contains("1. **Groceries**"));
        assert_eq!(text.matches("📌 Pinned").count(), 1);
    }

    #[test]
    fn test_date_range_list_uses_requested_field() {
        let text = date_range_list(
            &[sample_note()],
            SortField::Created,
            "2023-03-01",
            "2023-03-31",
        );
        assert!(text.starts_with("# Notes Created Between 2023-03-01 and 2023-03-31\n"));
        assert!(text.contains("Created: 2023-03-08T20:26:40.000Z"));
    }

    #[test]
    fn test_stats_report_rounds_average() {
        let stats = NoteStatistics {
            total_notes: 3,
            pinned_notes: 1,
            notes_with_tags: 2,
            unique_tags: 4,
            top_tags: vec![Tag { name: "daily".into(), note_count: 9 }],
            average_note_length: 266.6667,
            created_this_week: 1,
            modified_this_week: 2,
            created_this_month: 3,
            modified_this_month: 3,
            length_distribution: LengthDistribution {
                very_short: 1,
                short: 1,
                medium: 1,
                long: 0,
                very_long: 0,
            },
        };
        let text = stats_report(&stats);
        assert!(text.contains("- **Average Note Length:** 267 characters\n"));
        assert!(text.contains("1. **#daily** (9 notes)\n"));
        assert!(text.contains("- **Very Short (<100 chars):** 1\n"));
    }
}
