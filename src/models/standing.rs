//! Participant standings: per-problem results and rule aggregates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{ProblemId, SubmissionId, UserId};
use crate::models::submission::{JudgeStatus, SubmissionEvent, SubtaskResult, sort_journal};

/// Authoritative (or freeze-filtered) result for one problem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemEntry {
    /// Submission this entry was folded from; absent for pending-only
    /// placeholders on a frozen board
    pub id: Option<SubmissionId>,
    pub pid: ProblemId,
    pub submitted_at: DateTime<Utc>,
    pub status: JudgeStatus,
    /// Effective score: penalized (ledo), merged (ioi-strict), or raw
    pub score: i64,
    /// Raw judged score before any coefficient
    pub original_score: i64,
    /// Deadline-penalized score (homework); equals `score` elsewhere
    pub penalty_score: i64,
    /// Recorded time in seconds (ACM: elapsed + attempt penalty)
    pub time_sec: i64,
    /// Counted failed attempts before this entry
    pub attempts: u32,
    /// Submissions hidden behind the freeze for this problem
    pub pending: u32,
    /// Best-known subtask results merged so far (ioi-strict)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subtasks: BTreeMap<u32, SubtaskResult>,
}

impl ProblemEntry {
    /// Entry folded from a concrete submission
    pub fn from_event(event: &SubmissionEvent) -> Self {
        ProblemEntry {
            id: Some(event.id),
            pid: event.pid,
            submitted_at: event.submitted_at,
            status: event.status,
            score: event.score,
            original_score: event.score,
            penalty_score: event.score,
            time_sec: 0,
            attempts: 0,
            pending: 0,
            subtasks: BTreeMap::new(),
        }
    }

    /// Placeholder shown while every submission to `pid` is frozen
    pub fn pending_only(pid: ProblemId, submitted_at: DateTime<Utc>) -> Self {
        ProblemEntry {
            id: None,
            pid,
            submitted_at,
            status: JudgeStatus::Waiting,
            score: 0,
            original_score: 0,
            penalty_score: 0,
            time_sec: 0,
            attempts: 0,
            pending: 0,
            subtasks: BTreeMap::new(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.status.is_accepted()
    }
}

/// Per-rule aggregate record
///
/// Each rule produces its own explicit shape; the accessor methods give
/// callers the common score-ish and time-ish fields without assuming a
/// universal schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleAggregate {
    Acm {
        /// Problems whose display entry is accepted
        accept: u32,
        /// Sum of recorded times over accepted problems, seconds
        time_sec: i64,
    },
    Oi {
        score: i64,
    },
    Ledo {
        score: i64,
        original_score: i64,
    },
    Homework {
        score: i64,
        penalty_score: i64,
        time_sec: i64,
    },
}

impl RuleAggregate {
    pub fn score(&self) -> i64 {
        match self {
            RuleAggregate::Acm { .. } => 0,
            RuleAggregate::Oi { score } => *score,
            RuleAggregate::Ledo { score, .. } => *score,
            RuleAggregate::Homework { score, .. } => *score,
        }
    }

    pub fn time_sec(&self) -> i64 {
        match self {
            RuleAggregate::Acm { time_sec, .. } => *time_sec,
            RuleAggregate::Homework { time_sec, .. } => *time_sec,
            _ => 0,
        }
    }

    pub fn accept(&self) -> u32 {
        match self {
            RuleAggregate::Acm { accept, .. } => *accept,
            _ => 0,
        }
    }

    pub fn original_score(&self) -> i64 {
        match self {
            RuleAggregate::Ledo { original_score, .. } => *original_score,
            other => other.score(),
        }
    }

    pub fn penalty_score(&self) -> i64 {
        match self {
            RuleAggregate::Homework { penalty_score, .. } => *penalty_score,
            other => other.score(),
        }
    }
}

/// Output of a stat fold: aggregate plus the two per-problem views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingStat {
    pub agg: RuleAggregate,
    /// Authoritative best result per problem, freeze-independent
    pub detail: BTreeMap<ProblemId, ProblemEntry>,
    /// Freeze-filtered view; equals `detail` unless locked
    pub display: BTreeMap<ProblemId, ProblemEntry>,
}

/// One participant's standing in a contest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantStanding {
    pub user_id: UserId,
    /// Time-ordered submission events for problems in the contest
    pub journal: Vec<SubmissionEvent>,
    pub stat: StandingStat,
    /// Optimistic-update revision, bumped on every recompute
    pub rev: u64,
}

impl ParticipantStanding {
    /// Fresh standing with an empty journal and the rule's zero aggregate
    pub fn new(user_id: UserId, agg: RuleAggregate) -> Self {
        ParticipantStanding {
            user_id,
            journal: Vec::new(),
            stat: StandingStat {
                agg,
                detail: BTreeMap::new(),
                display: BTreeMap::new(),
            },
            rev: 0,
        }
    }

    /// Append a submission event, keeping the journal time-ordered
    ///
    /// Late-arriving judgements may carry an earlier instant than the
    /// journal tail, so ordering is restored rather than assumed.
    pub fn push(&mut self, event: SubmissionEvent) {
        let in_order = self
            .journal
            .last()
            .is_none_or(|last| last.submitted_at <= event.submitted_at);
        self.journal.push(event);
        if !in_order {
            sort_journal(&mut self.journal);
        }
    }
}
