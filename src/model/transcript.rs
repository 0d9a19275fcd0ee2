// File: ./src/model/transcript.rs
use crate::config::ExtractorConfig;
use crate::model::datetime;
use crate::model::item::{DEFAULT_ASSIGNEE, ParsedTask, TaskKind, TaskStatus};
use crate::model::parser;
use crate::source::{CandidateSource, TaskCandidate};
use chrono::{DateTime, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

const SOURCE_TIMEOUT: Duration = Duration::from_secs(20);
/// Longest clause-derived fallback title.
const CLAUSE_TITLE_MAX: usize = 100;
/// Units at or below this trimmed length never form a task.
const MIN_UNIT_LEN: usize = 5;

static RE_SENTENCE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());
static RE_TITLE_FILLER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:you|please|can you|to)\s+").unwrap());
static RE_TRAILING_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*[.,:;!?]\s*$").unwrap());

// Connecting words that may sit between a leading name and the task clause.
const CONNECTOR_WORDS: &[&str] = &[
    "you",
    "please",
    "can you",
    "will",
    "should",
    "needs to",
    "has to",
    "must",
    "is going to",
    "would",
];

// Obligation verbs for the embedded "<name> will ..." form.
const OBLIGATION_VERBS: &[&str] = &["will", "should", "needs to", "has to", "must", "is going to"];

/// Attribution patterns compiled once per roster name.
struct NameRules {
    name: String,
    prefix: Regex,
    connector: Regex,
    lead: Regex,
    embedded: Vec<Regex>,
}

impl NameRules {
    fn compile(name: &str) -> Self {
        let quoted = regex::escape(name);
        let connectors = CONNECTOR_WORDS.join("|");
        let verbs = OBLIGATION_VERBS.join("|");
        Self {
            name: name.to_string(),
            prefix: Regex::new(&format!(r"(?i)^[^a-zA-Z]*{quoted}\b")).unwrap(),
            connector: Regex::new(&format!(
                r"(?i)^[^a-zA-Z]*{quoted}\s+(?:{connectors})\s+"
            ))
            .unwrap(),
            lead: Regex::new(&format!(r"(?i)^[^a-zA-Z]*{quoted}\s+")).unwrap(),
            embedded: vec![
                Regex::new(&format!(r"(?i)\b{quoted}\s+(?:{verbs})\b")).unwrap(),
                Regex::new(&format!(r"(?i)\bask\s+{quoted}\s+to\b")).unwrap(),
                Regex::new(&format!(r"(?i)\bassign\s+to\s+{quoted}\b")).unwrap(),
                Regex::new(&format!(r"(?i)\b{quoted}'s\s+responsibility\b")).unwrap(),
            ],
        }
    }
}

/// Splits a transcript into sentence-like units, attributes each to a roster
/// name, and runs the residual clause through the single-line extractor.
pub struct TranscriptSegmenter {
    roster: Vec<NameRules>,
}

impl TranscriptSegmenter {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self::with_roster(&config.roster)
    }

    /// Roster order is matching priority: the first name that fits wins,
    /// with no longest-match preference.
    pub fn with_roster<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            roster: names
                .iter()
                .map(|n| NameRules::compile(n.as_ref()))
                .collect(),
        }
    }

    /// Tier A: the unit opens with a roster name (non-letter junk allowed in
    /// front). Strips `name + connector` from the clause, or just the name
    /// when no connector follows.
    fn attribute_prefix(&self, line: &str) -> Option<(String, String)> {
        for rules in &self.roster {
            if line.starts_with(&rules.name) || rules.prefix.is_match(line) {
                let clause = if let Some(m) = rules.connector.find(line) {
                    line[m.end()..].trim().to_string()
                } else if let Some(m) = rules.lead.find(line) {
                    line[m.end()..].trim().to_string()
                } else {
                    line.to_string()
                };
                return Some((rules.name.clone(), clause));
            }
        }
        None
    }

    /// Tier B: the name shows up mid-sentence in an assignment shape. Only
    /// the assignee is captured; the clause stays whole.
    fn attribute_embedded(&self, line: &str) -> Option<String> {
        for rules in &self.roster {
            if rules.embedded.iter().any(|re| re.is_match(line)) {
                return Some(rules.name.clone());
            }
        }
        None
    }

    fn sentence_to_task(&self, sentence: &str, now: DateTime<Local>) -> Option<ParsedTask> {
        let line = sentence.trim();
        let (attributed, clause) = match self.attribute_prefix(line) {
            Some((name, clause)) => (Some(name), clause),
            None => (self.attribute_embedded(line), line.to_string()),
        };

        let mut task = parser::parse_task_fields_at(&clause, now);
        if task.title.is_empty() {
            task.title = clause.chars().take(CLAUSE_TITLE_MAX).collect();
        }
        if let Some(name) = attributed {
            // Attribution beats whatever the clause's own assignee pass saw.
            task.assignee = name;
        }
        task.status = TaskStatus::Pending;
        task.kind = TaskKind::Transcript;
        task.title = clean_title(&task.title);

        if task.title.chars().count() > 3 {
            Some(task)
        } else {
            log::debug!("skipping transcript unit with unusable title: {line:?}");
            None
        }
    }

    /// Rule-based batch extraction with an injected clock. A unit that fails
    /// to produce a keepable task is dropped; the batch never aborts.
    pub fn extract_with_rules_at(
        &self,
        transcript: &str,
        now: DateTime<Local>,
    ) -> Vec<ParsedTask> {
        RE_SENTENCE_SPLIT
            .split(transcript)
            .filter(|unit| unit.trim().len() > MIN_UNIT_LEN)
            .filter_map(|unit| self.sentence_to_task(unit, now))
            .collect()
    }

    pub fn extract_with_rules(&self, transcript: &str) -> Vec<ParsedTask> {
        self.extract_with_rules_at(transcript, Local::now())
    }

    /// Batch entry point. A candidate source answering with at least one
    /// task short-circuits the rule-based path; an error, a timeout or an
    /// empty answer falls through to it. Never fails.
    pub async fn extract_tasks_at(
        &self,
        source: &dyn CandidateSource,
        transcript: &str,
        now: DateTime<Local>,
    ) -> Vec<ParsedTask> {
        match tokio::time::timeout(SOURCE_TIMEOUT, source.extract(transcript)).await {
            Ok(Ok(candidates)) if !candidates.is_empty() => {
                return candidates
                    .into_iter()
                    .map(|c| candidate_to_task(c, now))
                    .collect();
            }
            Ok(Ok(_)) => {
                log::debug!("candidate source returned nothing; using rule-based extraction");
            }
            Ok(Err(err)) => {
                log::warn!("candidate source failed ({err:#}); using rule-based extraction");
            }
            Err(_) => {
                log::warn!("candidate source timed out; using rule-based extraction");
            }
        }
        self.extract_with_rules_at(transcript, now)
    }

    pub async fn extract_tasks(
        &self,
        source: &dyn CandidateSource,
        transcript: &str,
    ) -> Vec<ParsedTask> {
        self.extract_tasks_at(source, transcript, Local::now()).await
    }
}

/// Batch entry point wired to the default roster.
pub async fn extract_tasks_from_transcript(
    source: &dyn CandidateSource,
    transcript: &str,
) -> Vec<ParsedTask> {
    TranscriptSegmenter::new(&ExtractorConfig::default())
        .extract_tasks(source, transcript)
        .await
}

/// Already-structured candidates are used as-is; only the date literal and
/// the priority go through validation.
fn candidate_to_task(candidate: TaskCandidate, now: DateTime<Local>) -> ParsedTask {
    let literal = candidate.due_date.trim();
    let due_date = NaiveDate::parse_from_str(literal, "%Y-%m-%d")
        .ok()
        .and_then(datetime::end_of_day)
        .unwrap_or_else(|| datetime::extract_at(&format!("by {literal}"), now).date);

    let assignee = if candidate.assignee.trim().is_empty() {
        DEFAULT_ASSIGNEE.to_string()
    } else {
        candidate.assignee
    };

    ParsedTask {
        title: candidate.title,
        description: String::new(),
        assignee,
        due_date,
        priority: candidate.priority.trim().parse().unwrap_or_default(),
        status: TaskStatus::Todo,
        kind: TaskKind::Transcript,
    }
}

fn clean_title(title: &str) -> String {
    let trimmed = RE_TITLE_FILLER.replace(title.trim_start(), "");
    let trimmed = RE_TRAILING_PUNCT.replace(&trimmed, "");
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
