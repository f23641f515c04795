//! Points-based ("OI") rule: best score per problem, summed
//!
//! The ioi, ioi-strict, and ledo rules derive from this one; their impls
//! delegate to the fold and builder functions here and override the rest.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::external::Labeler;
use crate::models::{
    CellKind, ContestConfig, HighlightStyle, ParticipantStanding, ProblemEntry, ProblemId,
    ProblemMeta, RenderOptions, RuleAggregate, ScoreboardCell, ScoreboardRow, StandingStat,
    SubmissionEvent, UserInfo,
};
use crate::scoreboard::{
    RowContext, bump_counters, column_label, identity_cells, identity_header_cells, rank_cell,
    render_view, user_cell,
};
use crate::utils::time::{format_elapsed, seconds_since};

use super::{Freeze, ScoringRule};

pub struct Oi;

/// Fold a journal under points semantics
///
/// The authoritative entry per problem is the highest-scoring submission,
/// or simply the latest when `submit_after_accept` is set.
pub(crate) fn fold(
    cfg: &ContestConfig,
    journal: &[SubmissionEvent],
    now: DateTime<Utc>,
    submit_after_accept: bool,
) -> StandingStat {
    let freeze = Freeze::of(cfg, now);
    let mut detail: BTreeMap<ProblemId, ProblemEntry> = BTreeMap::new();
    let mut display: BTreeMap<ProblemId, ProblemEntry> = BTreeMap::new();

    for event in journal {
        if !cfg.pids.contains(&event.pid) {
            continue;
        }
        let mut entry = ProblemEntry::from_event(event);
        entry.time_sec = seconds_since(cfg.begin_at, event.submitted_at);

        replace_if_better(&mut detail, entry.clone(), submit_after_accept);
        if freeze.hides(event.submitted_at) {
            display
                .entry(event.pid)
                .or_insert_with(|| {
                    ProblemEntry::pending_only(event.pid, freeze.clamp(event.submitted_at))
                })
                .pending += 1;
        } else {
            replace_if_better(&mut display, entry, submit_after_accept);
        }
    }

    let agg = aggregate(&display);
    StandingStat { agg, detail, display }
}

/// Install `entry` when it beats (or, latest-wins, follows) the current one
pub(crate) fn replace_if_better(
    entries: &mut BTreeMap<ProblemId, ProblemEntry>,
    entry: ProblemEntry,
    latest_wins: bool,
) {
    match entries.get_mut(&entry.pid) {
        None => {
            entries.insert(entry.pid, entry);
        }
        Some(current) => {
            if latest_wins || entry.score > current.score {
                // Carry the pending counter across the swap
                let pending = current.pending;
                *current = entry;
                current.pending = pending;
            }
        }
    }
}

/// Total score over the display view
pub(crate) fn aggregate(display: &BTreeMap<ProblemId, ProblemEntry>) -> RuleAggregate {
    RuleAggregate::Oi {
        score: display.values().map(|e| e.score).sum(),
    }
}

/// OI-family header: rank, user, total score, one column per problem
pub(crate) fn header(
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
    }
    header.push(ScoreboardCell::plain(
        CellKind::TotalScore,
        labels.label("Total Score"),
    ));

    for (index, pid) in cfg.pids.iter().enumerate() {
        let meta = problems.entry(*pid).or_default();
        meta.reset_counters();
        let label = column_label(index);
        if opts.is_export {
            let title = if meta.title.is_empty() {
                label
            } else {
                meta.title.clone()
            };
            header.push(
                ScoreboardCell::plain(CellKind::Problem, title).with_raw(json!(pid.to_string())),
            );
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

/// OI-family row
///
/// After the contest ends, a problem whose frozen contest-time score
/// diverges from the final judged score renders as a two-valued cell so
/// viewers see both.
#[allow(clippy::too_many_arguments)]
pub(crate) fn row(
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
    }
    let mut total = ScoreboardCell::plain(CellKind::TotalScore, agg.score().to_string())
        .with_raw(json!(agg.score()));
    if agg.original_score() != agg.score() {
        total = total.with_hover(format!("raw {}", agg.original_score()));
    }
    row.push(total);

    let done = cfg.is_done(None, ctx.now);
    let view = render_view(standing, cfg, opts, ctx.now);
    for pid in &cfg.pids {
        let shown = view.get(pid);
        let final_entry = standing.stat.detail.get(pid);
        row.push(match (shown, final_entry) {
            (Some(frozen), Some(truth)) if done && frozen.score != truth.score => {
                // Post-contest rejudge divergence: contest-time and final
                let contest_time = if frozen.id.is_some() {
                    frozen.score.to_string()
                } else {
                    "?".to_string()
                };
                ScoreboardCell::plain(
                    CellKind::Records,
                    format!("{} / {}", contest_time, truth.score),
                )
                .with_raw(json!([frozen.score, truth.score]))
            }
            (Some(entry), _) => problem_cell(entry, ctx.first_accept.get(pid).copied()),
            (None, _) => ScoreboardCell::plain(CellKind::Record, ""),
        });
    }
    row
}

fn problem_cell(entry: &ProblemEntry, first_at: Option<DateTime<Utc>>) -> ScoreboardCell {
    let mut value = if entry.id.is_some() {
        entry.score.to_string()
    } else {
        String::new()
    };
    if entry.pending > 0 {
        if !value.is_empty() {
            value.push(' ');
        }
        value.push_str(&format!("?{}", entry.pending));
    }
    let mut cell = ScoreboardCell::plain(CellKind::Record, value).with_raw(json!(entry.score));
    if entry.id.is_some() {
        cell = cell.with_hover(format_elapsed(entry.time_sec));
    }
    if entry.is_accepted() && first_at == Some(entry.submitted_at) {
        cell = cell.with_style(HighlightStyle::FirstAccept);
    }
    cell
}

impl ScoringRule for Oi {
    fn key(&self) -> &'static str {
        "oi"
    }

    fn label(&self) -> &'static str {
        "OI"
    }

    fn submit_after_accept(&self) -> bool {
        true
    }

    fn compare(&self, a: &ParticipantStanding, b: &ParticipantStanding) -> Ordering {
        b.stat.agg.score().cmp(&a.stat.agg.score())
    }

    fn tied(&self, a: &ParticipantStanding, b: &ParticipantStanding) -> bool {
        a.stat.agg.score() == b.stat.agg.score()
    }

    fn show_scoreboard(&self, cfg: &ContestConfig, now: DateTime<Utc>) -> bool {
        cfg.is_done(None, now)
    }

    fn show_self_record(&self, cfg: &ContestConfig, now: DateTime<Utc>) -> bool {
        cfg.is_done(None, now)
    }

    fn show_record(&self, cfg: &ContestConfig, now: DateTime<Utc>) -> bool {
        cfg.is_done(None, now) && !cfg.is_locked(now)
    }

    fn stat(
        &self,
        cfg: &ContestConfig,
        journal: &[SubmissionEvent],
        now: DateTime<Utc>,
    ) -> StandingStat {
        fold(
            cfg,
            journal,
            now,
            cfg.submit_after_accept_or(self.submit_after_accept()),
        )
    }

    fn scoreboard_header(
        &self,
        opts: &RenderOptions,
        labels: &dyn Labeler,
        cfg: &ContestConfig,
        problems: &mut HashMap<ProblemId, ProblemMeta>,
    ) -> ScoreboardRow {
        header(opts, labels, cfg, problems)
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
        row(opts, labels, cfg, problems, user, rank, standing, ctx)
    }
}
