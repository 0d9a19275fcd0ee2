// Crate root library declaration and module exports.
pub mod config;
pub mod model;
pub mod source;

pub use config::ExtractorConfig;
pub use model::datetime::{
    DateExtraction, extract as extract_date, extract_at as extract_date_at, format_date,
};
pub use model::item::{ParsedTask, Priority, TaskKind, TaskStatus};
pub use model::parser::{parse_task_fields_at, parse_task_from_text};
pub use model::transcript::{TranscriptSegmenter, extract_tasks_from_transcript};
pub use source::{CandidateSource, NoSource, TaskCandidate, parse_candidate_payload};
