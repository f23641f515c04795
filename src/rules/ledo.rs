//! Ledo rule, derived from OI: retry decay
//!
//! The n-th counted attempt on a problem is worth
//! `max(0.70, 0.95^(n-1))` of its raw score, rounded to the nearest
//! integer; the best penalized score wins. The aggregate keeps both the
//! penalized and the raw sums so the two stay traceable when they diverge.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::external::Labeler;
use crate::models::{
    ContestConfig, ParticipantStanding, ProblemEntry, ProblemId, ProblemMeta, RenderOptions,
    RuleAggregate, ScoreboardRow, StandingStat, SubmissionEvent, UserInfo,
};
use crate::scoreboard::RowContext;
use crate::utils::time::seconds_since;

use super::{Freeze, ScoringRule, oi};

/// Decay multiplier per additional attempt
pub const DECAY_PER_ATTEMPT: f64 = 0.95;

/// Decay never drops below this floor
pub const DECAY_FLOOR: f64 = 0.70;

/// Coefficient applied to the n-th counted attempt (1-based)
pub fn decay_coefficient(attempt: u32) -> f64 {
    DECAY_FLOOR.max(DECAY_PER_ATTEMPT.powi(attempt.saturating_sub(1) as i32))
}

pub struct Ledo;

/// Fold a journal under retry-decay semantics
pub(crate) fn fold(
    cfg: &ContestConfig,
    journal: &[SubmissionEvent],
    now: DateTime<Utc>,
) -> StandingStat {
    let freeze = Freeze::of(cfg, now);
    let mut detail: BTreeMap<ProblemId, ProblemEntry> = BTreeMap::new();
    let mut display: BTreeMap<ProblemId, ProblemEntry> = BTreeMap::new();
    let mut tries: HashMap<ProblemId, u32> = HashMap::new();

    for event in journal {
        if !cfg.pids.contains(&event.pid) {
            continue;
        }
        // Compile and format errors neither score nor consume an attempt
        if !event.status.is_counted() {
            continue;
        }
        let attempt = tries.entry(event.pid).or_insert(0);
        *attempt += 1;
        let coefficient = decay_coefficient(*attempt);
        let penalized = (event.score as f64 * coefficient).round() as i64;

        let mut entry = ProblemEntry::from_event(event);
        entry.score = penalized;
        entry.penalty_score = penalized;
        entry.attempts = *attempt - 1;
        entry.time_sec = seconds_since(cfg.begin_at, event.submitted_at);

        oi::replace_if_better(&mut detail, entry.clone(), false);
        if freeze.hides(event.submitted_at) {
            display
                .entry(event.pid)
                .or_insert_with(|| {
                    ProblemEntry::pending_only(event.pid, freeze.clamp(event.submitted_at))
                })
                .pending += 1;
        } else {
            oi::replace_if_better(&mut display, entry, false);
        }
    }

    let agg = aggregate(&display);
    StandingStat { agg, detail, display }
}

/// Penalized and raw sums over the display view
pub(crate) fn aggregate(display: &BTreeMap<ProblemId, ProblemEntry>) -> RuleAggregate {
    RuleAggregate::Ledo {
        score: display.values().map(|e| e.score).sum(),
        original_score: display.values().map(|e| e.original_score).sum(),
    }
}

impl ScoringRule for Ledo {
    fn key(&self) -> &'static str {
        "ledo"
    }

    fn label(&self) -> &'static str {
        "Ledo"
    }

    fn compare(&self, a: &ParticipantStanding, b: &ParticipantStanding) -> Ordering {
        oi::Oi.compare(a, b)
    }

    fn tied(&self, a: &ParticipantStanding, b: &ParticipantStanding) -> bool {
        oi::Oi.tied(a, b)
    }

    fn show_scoreboard(&self, cfg: &ContestConfig, now: DateTime<Utc>) -> bool {
        oi::Oi.show_scoreboard(cfg, now)
    }

    fn show_self_record(&self, cfg: &ContestConfig, now: DateTime<Utc>) -> bool {
        oi::Oi.show_self_record(cfg, now)
    }

    fn show_record(&self, cfg: &ContestConfig, now: DateTime<Utc>) -> bool {
        oi::Oi.show_record(cfg, now)
    }

    fn stat(
        &self,
        cfg: &ContestConfig,
        journal: &[SubmissionEvent],
        now: DateTime<Utc>,
    ) -> StandingStat {
        fold(cfg, journal, now)
    }

    fn scoreboard_header(
        &self,
        opts: &RenderOptions,
        labels: &dyn Labeler,
        cfg: &ContestConfig,
        problems: &mut HashMap<ProblemId, ProblemMeta>,
    ) -> ScoreboardRow {
        oi::header(opts, labels, cfg, problems)
    }

    fn scoreboard_row(
        &self,
        opts: &RenderOptions,
        labels: &dyn Labeler,
        cfg: &ContestConfig,
        problems: &mut HashMap<ProblemId, ProblemMeta>,
        user: &UserInfo,
        rank: usize,
        standing: &ParticipantStanding,
        ctx: &RowContext<'_>,
    ) -> ScoreboardRow {
        oi::row(opts, labels, cfg, problems, user, rank, standing, ctx)
    }
}
