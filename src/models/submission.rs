//! Submission events and judge verdicts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{ProblemId, SubmissionId};

/// Judge verdict for a submission or a single subtask
///
/// The ordinal matters: higher means worse. Subtask merging takes the
/// numerically highest status as the effective one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JudgeStatus {
    /// Waiting in queue or still running
    Waiting = 0,
    /// All tests passed
    Accepted = 1,
    /// Output mismatch
    WrongAnswer = 2,
    /// Exceeded time limit
    TimeLimitExceeded = 3,
    /// Exceeded memory limit
    MemoryLimitExceeded = 4,
    /// Program crashed
    RuntimeError = 5,
    /// Compilation failed
    CompileError = 6,
    /// Output format violation
    FormatError = 7,
}

impl JudgeStatus {
    pub fn is_accepted(self) -> bool {
        self == JudgeStatus::Accepted
    }

    /// Whether the verdict counts as a real attempt
    ///
    /// Compile and format errors never count toward penalties or
    /// retry-decay attempt numbers.
    pub fn is_counted(self) -> bool {
        !matches!(self, JudgeStatus::CompileError | JudgeStatus::FormatError)
    }
}

impl std::fmt::Display for JudgeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JudgeStatus::Waiting => write!(f, "WAITING"),
            JudgeStatus::Accepted => write!(f, "ACCEPTED"),
            JudgeStatus::WrongAnswer => write!(f, "WRONG_ANSWER"),
            JudgeStatus::TimeLimitExceeded => write!(f, "TIME_LIMIT_EXCEEDED"),
            JudgeStatus::MemoryLimitExceeded => write!(f, "MEMORY_LIMIT_EXCEEDED"),
            JudgeStatus::RuntimeError => write!(f, "RUNTIME_ERROR"),
            JudgeStatus::CompileError => write!(f, "COMPILE_ERROR"),
            JudgeStatus::FormatError => write!(f, "FORMAT_ERROR"),
        }
    }
}

/// Score and status for one independently evaluated subtask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskResult {
    pub score: i64,
    pub status: JudgeStatus,
}

/// One immutable journal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionEvent {
    pub id: SubmissionId,
    pub pid: ProblemId,
    pub submitted_at: DateTime<Utc>,
    pub status: JudgeStatus,
    /// Raw judged score
    pub score: i64,
    /// Elapsed judging time in milliseconds
    #[serde(default)]
    pub judge_time_ms: i64,
    /// Per-subtask results keyed by subtask index, when the judge emits them
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subtasks: BTreeMap<u32, SubtaskResult>,
}

/// Order a journal by submission instant
///
/// Every stat fold requires this ordering; ties break on submission id so
/// re-sorting is deterministic.
pub fn sort_journal(journal: &mut [SubmissionEvent]) {
    journal.sort_by(|a, b| {
        a.submitted_at
            .cmp(&b.submitted_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
