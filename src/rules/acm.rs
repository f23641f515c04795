//! ACM/ICPC rule: solved count plus penalty time
//!
//! Each prior counted failed attempt on a problem adds 20 minutes to the
//! recorded time of its eventual accept. Standings order by problems
//! solved, then total time.

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

/// Penalty per counted failed attempt, in seconds
pub const ATTEMPT_PENALTY_SEC: i64 = 20 * 60;

pub struct Acm;

/// Fold a journal under ACM semantics
pub(crate) fn fold(
    cfg: &ContestConfig,
    journal: &[SubmissionEvent],
    now: DateTime<Utc>,
    submit_after_accept: bool,
) -> StandingStat {
    let freeze = Freeze::of(cfg, now);
    let mut detail: BTreeMap<ProblemId, ProblemEntry> = BTreeMap::new();
    let mut display: BTreeMap<ProblemId, ProblemEntry> = BTreeMap::new();
    let mut fails: HashMap<ProblemId, u32> = HashMap::new();

    for event in journal {
        if !cfg.pids.contains(&event.pid) {
            continue;
        }
        let solved = detail.get(&event.pid).is_some_and(ProblemEntry::is_accepted);
        if solved {
            // An accepted result is final. When submitting after accept is
            // allowed, frozen resubmissions still show up as pending.
            if submit_after_accept && freeze.hides(event.submitted_at) {
                if let Some(shown) = display.get_mut(&event.pid) {
                    shown.pending += 1;
                }
            }
            continue;
        }

        let prior_fails = fails.get(&event.pid).copied().unwrap_or(0);
        let mut entry = ProblemEntry::from_event(event);
        entry.attempts = prior_fails;
        entry.time_sec = seconds_since(cfg.begin_at, event.submitted_at)
            + ATTEMPT_PENALTY_SEC * i64::from(prior_fails);

        detail.insert(event.pid, entry.clone());

        if freeze.hides(event.submitted_at) {
            display
                .entry(event.pid)
                .or_insert_with(|| {
                    ProblemEntry::pending_only(event.pid, freeze.clamp(event.submitted_at))
                })
                .pending += 1;
        } else {
            display.insert(event.pid, entry);
        }

        if event.status.is_counted() && !event.status.is_accepted() {
            *fails.entry(event.pid).or_insert(0) += 1;
        }
    }

    let agg = aggregate(&display);
    StandingStat { agg, detail, display }
}

/// Solved count and total time over the display view
pub(crate) fn aggregate(display: &BTreeMap<ProblemId, ProblemEntry>) -> RuleAggregate {
    let accepted = display.values().filter(|e| e.is_accepted());
    RuleAggregate::Acm {
        accept: accepted.clone().count() as u32,
        time_sec: accepted.map(|e| e.time_sec).sum(),
    }
}

fn problem_cell(entry: &ProblemEntry, first_at: Option<DateTime<Utc>>) -> ScoreboardCell {
    if entry.is_accepted() {
        let value = if entry.attempts > 0 {
            format!("+{}", entry.attempts)
        } else {
            "+".to_string()
        };
        let mut cell = ScoreboardCell::plain(CellKind::Record, value)
            .with_raw(json!(entry.time_sec))
            .with_hover(format_elapsed(entry.time_sec));
        if first_at == Some(entry.submitted_at) {
            cell = cell.with_style(HighlightStyle::FirstAccept);
        }
        return cell;
    }

    let mut value = if entry.id.is_some() {
        let tries = entry.attempts + u32::from(entry.status.is_counted());
        format!("-{tries}")
    } else {
        String::new()
    };
    if entry.pending > 0 {
        if !value.is_empty() {
            value.push(' ');
        }
        value.push_str(&format!("?{}", entry.pending));
    }
    ScoreboardCell::plain(CellKind::Record, value)
}

impl ScoringRule for Acm {
    fn key(&self) -> &'static str {
        "acm"
    }

    fn label(&self) -> &'static str {
        "ACM/ICPC"
    }

    fn compare(&self, a: &ParticipantStanding, b: &ParticipantStanding) -> Ordering {
        b.stat
            .agg
            .accept()
            .cmp(&a.stat.agg.accept())
            .then_with(|| a.stat.agg.time_sec().cmp(&b.stat.agg.time_sec()))
    }

    fn tied(&self, a: &ParticipantStanding, b: &ParticipantStanding) -> bool {
        a.stat.agg.accept() == b.stat.agg.accept()
            && a.stat.agg.time_sec() == b.stat.agg.time_sec()
    }

    fn show_scoreboard(&self, cfg: &ContestConfig, now: DateTime<Utc>) -> bool {
        !cfg.is_not_started(now)
    }

    fn show_self_record(&self, _cfg: &ContestConfig, _now: DateTime<Utc>) -> bool {
        true
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
        let mut header = vec![
            ScoreboardCell::plain(CellKind::Rank, labels.label("Rank")),
            ScoreboardCell::plain(CellKind::User, labels.label("User")),
        ];
        if opts.is_export {
            header.extend(identity_header_cells(labels));
            header.push(ScoreboardCell::plain(
                CellKind::TotalScore,
                labels.label("Solved"),
            ));
            header.push(ScoreboardCell::plain(
                CellKind::Time,
                labels.label("Total Time"),
            ));
        } else {
            header.push(ScoreboardCell::plain(
                CellKind::TotalScore,
                labels.label("Solved"),
            ));
        }

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
                    CellKind::Time,
                    labels.format("{0} Time", &[&label]),
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
                ScoreboardCell::plain(CellKind::TotalScore, agg.accept().to_string())
                    .with_raw(json!(agg.accept())),
            );
            row.push(
                ScoreboardCell::plain(CellKind::Time, format_elapsed(agg.time_sec()))
                    .with_raw(json!(agg.time_sec())),
            );
        } else {
            row.push(
                ScoreboardCell::plain(CellKind::TotalScore, agg.accept().to_string())
                    .with_raw(json!(agg.accept()))
                    .with_hover(format_elapsed(agg.time_sec())),
            );
        }

        let view = render_view(standing, cfg, opts, ctx.now);
        for pid in &cfg.pids {
            match view.get(pid) {
                Some(entry) => {
                    row.push(problem_cell(entry, ctx.first_accept.get(pid).copied()));
                    if opts.is_export {
                        let time = if entry.is_accepted() {
                            format_elapsed(entry.time_sec)
                        } else {
                            String::new()
                        };
                        row.push(
                            ScoreboardCell::plain(CellKind::Time, time)
                                .with_raw(json!(entry.time_sec)),
                        );
                    }
                }
                None => {
                    row.push(ScoreboardCell::plain(CellKind::Record, ""));
                    if opts.is_export {
                        row.push(ScoreboardCell::plain(CellKind::Time, ""));
                    }
                }
            }
        }
        row
    }
}
