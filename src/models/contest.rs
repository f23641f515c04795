//! Contest configuration and lifecycle predicates

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ScoreError, ScoreResult};
use crate::models::ProblemId;

/// Default day window for the new/upcoming split
pub const DEFAULT_NOTICE_DAYS: i64 = 1;

/// Immutable-per-evaluation contest configuration
///
/// The rule key selects a scoring policy from the registry; everything else
/// parameterizes scoring, freezing, and rendering for that policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContestConfig {
    /// Scoring rule key (`acm`, `oi`, `ioi`, `ioi-strict`, `ledo`, `homework`)
    pub rule: String,
    pub begin_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    /// Scoreboard freeze instant; must lie within `[begin_at, end_at]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_at: Option<DateTime<Utc>>,
    /// Manual override revealing true results while `lock_at` has passed
    #[serde(default)]
    pub unlocked: bool,
    /// Per-participant time budget for individually clocked contests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
    /// Ordered, de-duplicated problem ids; order defines scoreboard columns
    pub pids: Vec<ProblemId>,
    /// Overrides the rule's default submit-after-accept behavior
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_after_accept: Option<bool>,
    /// Instant after which the homework deadline penalty starts accruing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_since: Option<DateTime<Utc>>,
    /// Hour offset past `penalty_since` -> score multiplier (homework only)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub penalty_rules: BTreeMap<i64, f64>,
}

impl ContestConfig {
    /// Minimal well-formed configuration for the given rule and window
    pub fn new(
        rule: impl Into<String>,
        begin_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        pids: Vec<ProblemId>,
    ) -> Self {
        ContestConfig {
            rule: rule.into(),
            begin_at,
            end_at,
            lock_at: None,
            unlocked: false,
            duration: None,
            pids,
            submit_after_accept: None,
            penalty_since: None,
            penalty_rules: BTreeMap::new(),
        }
    }

    /// Validate the rule-independent invariants
    ///
    /// Per-rule checks run on top of this via `ScoringRule::check`.
    pub fn validate_base(&self) -> ScoreResult<()> {
        if self.begin_at >= self.end_at {
            return Err(ScoreError::InvalidTimeRange);
        }
        if let Some(lock_at) = self.lock_at {
            if lock_at < self.begin_at || lock_at > self.end_at {
                return Err(ScoreError::InvalidLockTime);
            }
        }
        let mut seen = std::collections::HashSet::new();
        for pid in &self.pids {
            if !seen.insert(pid) {
                return Err(ScoreError::Configuration(format!(
                    "Duplicate problem id: {pid}"
                )));
            }
        }
        Ok(())
    }

    /// More than `days` days before the contest starts
    pub fn is_new(&self, now: DateTime<Utc>, days: i64) -> bool {
        self.begin_at - now > Duration::days(days)
    }

    /// Within `days` days before the contest starts
    pub fn is_upcoming(&self, now: DateTime<Utc>, days: i64) -> bool {
        now < self.begin_at && self.begin_at - now <= Duration::days(days)
    }

    pub fn is_not_started(&self, now: DateTime<Utc>) -> bool {
        now < self.begin_at
    }

    /// Started, not ended, and the participant's individual budget (if any)
    /// not yet exhausted
    pub fn is_ongoing(
        &self,
        participant_start: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        if now < self.begin_at || now >= self.end_at {
            return false;
        }
        match (self.duration, participant_start) {
            (Some(budget), Some(started)) => now < started + budget,
            _ => true,
        }
    }

    /// Ended, or the participant's individual budget exhausted
    pub fn is_done(&self, participant_start: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        if now >= self.end_at {
            return true;
        }
        match (self.duration, participant_start) {
            (Some(budget), Some(started)) => now >= started + budget,
            _ => false,
        }
    }

    /// Freeze instant passed and not manually unlocked
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        !self.unlocked && self.lock_at.is_some_and(|lock_at| now >= lock_at)
    }

    /// Past `penalty_since` but before the contest ends (homework)
    pub fn is_extended(&self, now: DateTime<Utc>) -> bool {
        self.penalty_since
            .is_some_and(|since| now > since && now < self.end_at)
    }

    /// Effective submit-after-accept flag given the rule default
    pub fn submit_after_accept_or(&self, rule_default: bool) -> bool {
        self.submit_after_accept.unwrap_or(rule_default)
    }
}
