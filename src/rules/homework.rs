//! Homework rule, derived from OI: deadline penalty
//!
//! The latest submission per problem is authoritative and there is no
//! freeze concept. Submissions landing past `penalty_since` are scaled by
//! the multiplier of the smallest configured hour offset covering how late
//! they were; past the largest offset, that offset's multiplier applies.
//! Hidden from the visible rule list.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::error::{ScoreError, ScoreResult};
use crate::external::Labeler;
use crate::models::{
    CellKind, ContestConfig, ParticipantStanding, ProblemEntry, ProblemId, ProblemMeta,
    RenderOptions, RuleAggregate, ScoreboardCell, ScoreboardRow, StandingStat, SubmissionEvent,
    UserInfo,
};
use crate::scoreboard::{
    RowContext, bump_counters, column_label, identity_cells, identity_header_cells, rank_cell,
    user_cell,
};
use crate::utils::time::{format_elapsed, seconds_since};

use super::ScoringRule;

pub struct Homework;

/// Multiplier for a submission landing `at` under the given deadline rules
pub(crate) fn penalty_coefficient(
    penalty_since: Option<DateTime<Utc>>,
    penalty_rules: &BTreeMap<i64, f64>,
    at: DateTime<Utc>,
) -> f64 {
    let Some(since) = penalty_since else {
        return 1.0;
    };
    if at <= since || penalty_rules.is_empty() {
        return 1.0;
    }
    let hours_late = ((at - since).num_seconds() + 3599) / 3600;
    for (offset, coefficient) in penalty_rules {
        if *offset >= hours_late {
            return *coefficient;
        }
    }
    // Later than every configured offset
    *penalty_rules.values().last().expect("non-empty rules")
}

/// Fold a journal under deadline-penalty semantics
pub(crate) fn fold(cfg: &ContestConfig, journal: &[SubmissionEvent]) -> StandingStat {
    let mut detail: BTreeMap<ProblemId, ProblemEntry> = BTreeMap::new();

    for event in journal {
        if !cfg.pids.contains(&event.pid) {
            continue;
        }
        let coefficient =
            penalty_coefficient(cfg.penalty_since, &cfg.penalty_rules, event.submitted_at);
        let mut entry = ProblemEntry::from_event(event);
        entry.penalty_score = (event.score as f64 * coefficient).round() as i64;
        entry.time_sec = seconds_since(cfg.begin_at, event.submitted_at);
        // Latest submission wins unconditionally
        detail.insert(event.pid, entry);
    }

    let agg = aggregate(&detail);
    StandingStat {
        agg,
        display: detail.clone(),
        detail,
    }
}

/// Raw and penalized sums plus total recorded time
///
/// The time reduction is a plain sum, so an empty entry set yields zero.
pub(crate) fn aggregate(entries: &BTreeMap<ProblemId, ProblemEntry>) -> RuleAggregate {
    RuleAggregate::Homework {
        score: entries.values().map(|e| e.score).sum(),
        penalty_score: entries.values().map(|e| e.penalty_score).sum(),
        time_sec: entries.values().map(|e| e.time_sec).sum(),
    }
}

impl ScoringRule for Homework {
    fn key(&self) -> &'static str {
        "homework"
    }

    fn label(&self) -> &'static str {
        "Assignment"
    }

    fn hidden(&self) -> bool {
        true
    }

    fn submit_after_accept(&self) -> bool {
        true
    }

    fn check(&self, cfg: &ContestConfig) -> ScoreResult<()> {
        cfg.validate_base()?;
        let Some(since) = cfg.penalty_since else {
            return Err(ScoreError::Configuration(
                "Homework requires penalty_since".to_string(),
            ));
        };
        if since < cfg.begin_at || since > cfg.end_at {
            return Err(ScoreError::Configuration(
                "penalty_since must lie within the contest window".to_string(),
            ));
        }
        if cfg.penalty_rules.is_empty() {
            return Err(ScoreError::Configuration(
                "Homework requires non-empty penalty_rules".to_string(),
            ));
        }
        Ok(())
    }

    fn compare(&self, a: &ParticipantStanding, b: &ParticipantStanding) -> Ordering {
        b.stat
            .agg
            .penalty_score()
            .cmp(&a.stat.agg.penalty_score())
            .then_with(|| a.stat.agg.time_sec().cmp(&b.stat.agg.time_sec()))
    }

    fn tied(&self, a: &ParticipantStanding, b: &ParticipantStanding) -> bool {
        a.stat.agg.penalty_score() == b.stat.agg.penalty_score()
            && a.stat.agg.time_sec() == b.stat.agg.time_sec()
    }

    fn show_scoreboard(&self, cfg: &ContestConfig, now: DateTime<Utc>) -> bool {
        !cfg.is_not_started(now)
    }

    fn show_self_record(&self, _cfg: &ContestConfig, _now: DateTime<Utc>) -> bool {
        true
    }

    fn show_record(&self, cfg: &ContestConfig, now: DateTime<Utc>) -> bool {
        !cfg.is_not_started(now)
    }

    fn stat(
        &self,
        cfg: &ContestConfig,
        journal: &[SubmissionEvent],
        _now: DateTime<Utc>,
    ) -> StandingStat {
        fold(cfg, journal)
    }

    fn scoreboard_header(
        &self,
        opts: &RenderOptions,
        labels: &dyn Labeler,
        cfg: &ContestConfig,
        problems: &mut HashMap<ProblemId, ProblemMeta>,
    ) -> ScoreboardRow {
        let mut header = vec![
            ScoreboardCell::plain(CellKind::Rank, labels.label("Rank")),
            ScoreboardCell::plain(CellKind::User, labels.label("User")),
        ];
        if opts.is_export {
            header.extend(identity_header_cells(labels));
            header.push(ScoreboardCell::plain(
                CellKind::TotalScore,
                labels.label("Original Score"),
            ));
        }
        header.push(ScoreboardCell::plain(
            CellKind::TotalScore,
            labels.label("Score"),
        ));

        for (index, pid) in cfg.pids.iter().enumerate() {
            let meta = problems.entry(*pid).or_default();
            meta.reset_counters();
            let label = column_label(index);
            if opts.is_export {
                let title = if meta.title.is_empty() {
                    label.clone()
                } else {
                    meta.title.clone()
                };
                header.push(
                    ScoreboardCell::plain(CellKind::Problem, title)
                        .with_raw(json!(pid.to_string())),
                );
                header.push(ScoreboardCell::plain(
                    CellKind::String,
                    labels.format("{0} Penalty", &[&label]),
                ));
            } else {
                header.push(
                    ScoreboardCell::plain(CellKind::Problem, label)
                        .with_raw(json!(pid.to_string()))
                        .with_hover(meta.title.clone()),
                );
            }
        }
        header
    }

    fn scoreboard_row(
        &self,
        opts: &RenderOptions,
        _labels: &dyn Labeler,
        cfg: &ContestConfig,
        problems: &mut HashMap<ProblemId, ProblemMeta>,
        user: &UserInfo,
        rank: usize,
        standing: &ParticipantStanding,
        ctx: &RowContext<'_>,
    ) -> ScoreboardRow {
        bump_counters(cfg, opts, problems, standing, ctx.now);

        let agg = &standing.stat.agg;
        let mut row = vec![rank_cell(rank), user_cell(user, standing.user_id)];
        if opts.is_export {
            row.extend(identity_cells(user));
            row.push(
                ScoreboardCell::plain(CellKind::TotalScore, agg.score().to_string())
                    .with_raw(json!(agg.score())),
            );
        }
        let mut total =
            ScoreboardCell::plain(CellKind::TotalScore, agg.penalty_score().to_string())
                .with_raw(json!(agg.penalty_score()));
        if agg.penalty_score() != agg.score() {
            total = total.with_hover(format!("raw {}", agg.score()));
        }
        row.push(total);

        for pid in &cfg.pids {
            match standing.stat.detail.get(pid) {
                Some(entry) => {
                    let mut cell = ScoreboardCell::plain(
                        CellKind::Record,
                        entry.penalty_score.to_string(),
                    )
                    .with_raw(json!(entry.penalty_score))
                    .with_hover(format_elapsed(entry.time_sec));
                    if entry.penalty_score != entry.original_score {
                        cell = cell.with_hover(format!(
                            "raw {} at {}",
                            entry.original_score,
                            format_elapsed(entry.time_sec)
                        ));
                    }
                    row.push(cell);
                    if opts.is_export {
                        row.push(
                            ScoreboardCell::plain(
                                CellKind::String,
                                (entry.original_score - entry.penalty_score).to_string(),
                            )
                            .with_raw(json!(entry.original_score - entry.penalty_score)),
                        );
                    }
                }
                None => {
                    row.push(ScoreboardCell::plain(CellKind::Record, ""));
                    if opts.is_export {
                        row.push(ScoreboardCell::plain(CellKind::String, ""));
                    }
                }
            }
        }
        row
    }
}
