// File: ./src/model/parser.rs
use crate::model::datetime;
use crate::model::item::{DEFAULT_ASSIGNEE, DEFAULT_TITLE, ParsedTask, Priority, TaskKind, TaskStatus};
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static RE_PRIORITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:priority\s*:?\s*)?(p[1-4])\b").unwrap());

static RE_ASSIGNEE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:to|for|assign(?:ed)?\s+to|assignee)\b\s*:?\s*([A-Za-z]+)(?:\s|$)").unwrap()
});

// Union of the date-expression shapes the date extractor resolves behind a
// lead-in word. The captured literal gets re-submitted with a "by " prefix.
static RE_DUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:by|due|on|before|until)\b\s*(?:on\s*)?(?:the\s*)?(\d{1,2}(?:st|nd|rd|th)?(?:\s+of)?\s*(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?|jul(?:y)?|aug(?:ust)?|sep(?:tember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)(?:\s*,\s*\d{4})?|\d{1,2}[/\-]\d{1,2}(?:[/\-]\d{2,4})?|tomorrow|(?:next\s+)?(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)|next\s+\w+)",
    )
    .unwrap()
});

static RE_DESCRIPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[:\-]\s*(.+)").unwrap());

/// Single-line field extraction with an injected clock. Ordered passes over
/// a threaded remaining-text buffer; each pass removes its matched span so
/// later passes never re-match claimed text. Whatever survives becomes the
/// title. Never fails.
pub fn parse_task_fields_at(text: &str, now: DateTime<Local>) -> ParsedTask {
    let mut remaining = text.trim().to_string();
    let mut priority = Priority::default();
    let mut assignee = DEFAULT_ASSIGNEE.to_string();
    let mut due_date = datetime::default_due(now);
    let mut description = String::new();

    // 1. Priority. Stripped before the assignee pass so a trailing "P2"
    // cannot read as part of a name.
    if let Some(caps) = RE_PRIORITY.captures(&remaining) {
        priority = caps[1].to_uppercase().parse().unwrap_or_default();
        let stripped = strip_span(&remaining, span_of(&caps));
        remaining = stripped;
    }

    // 2. Assignee: lead-in word plus a single alphabetic token.
    if let Some(caps) = RE_ASSIGNEE.captures(&remaining) {
        assignee = caps[1].trim().to_string();
        let stripped = strip_span(&remaining, span_of(&caps));
        remaining = stripped;
    }

    // 3. Due date: the captured literal goes back through the date extractor
    // normalized behind "by ". The extractor is total, so the span is always
    // consumed once this regex fires.
    if let Some(caps) = RE_DUE.captures(&remaining) {
        let probe = format!("by {}", &caps[1]);
        due_date = datetime::extract_at(&probe, now).date;
        let stripped = strip_span(&remaining, span_of(&caps));
        remaining = stripped;
    }

    // 4. Description: everything after the first colon or dash.
    if let Some(caps) = RE_DESCRIPTION.captures(&remaining) {
        description = caps[1].trim().to_string();
        let stripped = strip_span(&remaining, span_of(&caps));
        remaining = stripped;
    }

    // 5. Title: the residue.
    let mut title = collapse_whitespace(&remaining);
    if title.is_empty() {
        title = DEFAULT_TITLE.to_string();
    } else if description.is_empty() && title.chars().count() > 50 {
        // Overlong bare titles split at the last space at or before
        // position 50; the tail becomes the description.
        let head: String = title.chars().take(51).collect();
        match head.rfind(' ') {
            Some(idx) => {
                description = title[idx + 1..].to_string();
                title.truncate(idx);
            }
            None => {
                description = title;
                title = DEFAULT_TITLE.to_string();
            }
        }
    }

    ParsedTask {
        title,
        description,
        assignee,
        due_date,
        priority,
        status: TaskStatus::Todo,
        kind: TaskKind::Manual,
    }
}

/// Single-task entry point: parses one line of free text against the wall
/// clock. Total over all inputs, including the empty string.
pub fn parse_task_from_text(text: &str) -> ParsedTask {
    parse_task_fields_at(text, Local::now())
}

fn span_of(caps: &regex::Captures) -> Range<usize> {
    caps.get(0).map(|m| m.range()).unwrap_or_default()
}

fn strip_span(text: &str, span: Range<usize>) -> String {
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..span.start]);
    out.push_str(&text[span.end..]);
    out.trim().to_string()
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
