//! IOI rules, derived from OI
//!
//! `ioi` keeps OI's fold but shows participants their own results (and the
//! board) while the contest runs. `ioi-strict` additionally replaces the
//! fold with subtask-max scoring: a problem's credit is the sum, across
//! subtasks, of the best score ever seen per subtask.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::external::Labeler;
use crate::models::{
    ContestConfig, JudgeStatus, ParticipantStanding, ProblemEntry, ProblemId, ProblemMeta,
    RenderOptions, ScoreboardRow, StandingStat, SubmissionEvent, SubtaskResult, UserInfo,
};
use crate::scoreboard::RowContext;
use crate::utils::time::seconds_since;

use super::{Freeze, ScoringRule, oi};

pub struct Ioi;

pub struct IoiStrict;

impl ScoringRule for Ioi {
    fn key(&self) -> &'static str {
        "ioi"
    }

    fn label(&self) -> &'static str {
        "IOI"
    }

    fn compare(&self, a: &ParticipantStanding, b: &ParticipantStanding) -> Ordering {
        oi::Oi.compare(a, b)
    }

    fn tied(&self, a: &ParticipantStanding, b: &ParticipantStanding) -> bool {
        oi::Oi.tied(a, b)
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
        oi::fold(
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

/// Fold a journal under strict subtask-max semantics
///
/// Subtask maxima are scoped per problem; a later, worse submission still
/// raises the recorded score if it improves any single subtask, so the
/// recorded score is non-decreasing over the journal.
pub(crate) fn fold_strict(
    cfg: &ContestConfig,
    journal: &[SubmissionEvent],
    now: DateTime<Utc>,
) -> StandingStat {
    let freeze = Freeze::of(cfg, now);
    let mut detail: BTreeMap<ProblemId, ProblemEntry> = BTreeMap::new();
    let mut display: BTreeMap<ProblemId, ProblemEntry> = BTreeMap::new();
    let mut best: HashMap<ProblemId, BTreeMap<u32, SubtaskResult>> = HashMap::new();

    for event in journal {
        if !cfg.pids.contains(&event.pid) {
            continue;
        }
        let merged = best.entry(event.pid).or_default();
        if event.subtasks.is_empty() {
            // No subtask data: treat the submission as one subtask
            merge_subtask(
                merged,
                0,
                SubtaskResult {
                    score: event.score,
                    status: event.status,
                },
            );
        } else {
            for (index, result) in &event.subtasks {
                merge_subtask(merged, *index, *result);
            }
        }

        let effective_score: i64 = merged.values().map(|s| s.score).sum();
        let effective_status = merged
            .values()
            .map(|s| s.status)
            .max()
            .unwrap_or(JudgeStatus::Waiting);

        let mut entry = ProblemEntry::from_event(event);
        entry.score = effective_score;
        entry.penalty_score = effective_score;
        entry.status = effective_status;
        entry.time_sec = seconds_since(cfg.begin_at, event.submitted_at);
        entry.subtasks = merged.clone();

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

    let agg = oi::aggregate(&display);
    StandingStat { agg, detail, display }
}

fn merge_subtask(merged: &mut BTreeMap<u32, SubtaskResult>, index: u32, result: SubtaskResult) {
    match merged.get_mut(&index) {
        None => {
            merged.insert(index, result);
        }
        Some(current) if result.score > current.score => *current = result,
        Some(_) => {}
    }
}

impl ScoringRule for IoiStrict {
    fn key(&self) -> &'static str {
        "ioi-strict"
    }

    fn label(&self) -> &'static str {
        "IOI (strict subtasks)"
    }

    fn compare(&self, a: &ParticipantStanding, b: &ParticipantStanding) -> Ordering {
        Ioi.compare(a, b)
    }

    fn tied(&self, a: &ParticipantStanding, b: &ParticipantStanding) -> bool {
        Ioi.tied(a, b)
    }

    fn show_scoreboard(&self, cfg: &ContestConfig, now: DateTime<Utc>) -> bool {
        Ioi.show_scoreboard(cfg, now)
    }

    fn show_self_record(&self, cfg: &ContestConfig, now: DateTime<Utc>) -> bool {
        Ioi.show_self_record(cfg, now)
    }

    fn show_record(&self, cfg: &ContestConfig, now: DateTime<Utc>) -> bool {
        Ioi.show_record(cfg, now)
    }

    fn stat(
        &self,
        cfg: &ContestConfig,
        journal: &[SubmissionEvent],
        now: DateTime<Utc>,
    ) -> StandingStat {
        fold_strict(cfg, journal, now)
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
    }

    fn config(rule: &str, pids: Vec<ProblemId>) -> ContestConfig {
        ContestConfig::new(rule, at(10, 0), at(15, 0), pids)
    }

    fn event(
        pid: ProblemId,
        when: DateTime<Utc>,
        subtasks: &[(u32, i64, JudgeStatus)],
    ) -> SubmissionEvent {
        let subtasks: BTreeMap<u32, SubtaskResult> = subtasks
            .iter()
            .map(|(index, score, status)| {
                (*index, SubtaskResult { score: *score, status: *status })
            })
            .collect();
        let score = subtasks.values().map(|s| s.score).sum();
        let status = subtasks
            .values()
            .map(|s| s.status)
            .max()
            .unwrap_or(JudgeStatus::Waiting);
        SubmissionEvent {
            id: Uuid::new_v4(),
            pid,
            submitted_at: when,
            status,
            score,
            judge_time_ms: 0,
            subtasks,
        }
    }

    #[test]
    fn test_ioi_board_is_live() {
        let cfg = config("ioi", vec![Uuid::new_v4()]);
        assert!(Ioi.show_scoreboard(&cfg, at(11, 0)));
        assert!(Ioi.show_self_record(&cfg, at(11, 0)));
        assert!(!Ioi.show_record(&cfg, at(11, 0)));
        assert!(Ioi.show_record(&cfg, at(16, 0)));
    }

    #[test]
    fn test_strict_merges_best_subtasks_across_submissions() {
        let pid = Uuid::new_v4();
        let cfg = config("ioi-strict", vec![pid]);
        let journal = vec![
            event(
                pid,
                at(10, 30),
                &[
                    (1, 40, JudgeStatus::Accepted),
                    (2, 0, JudgeStatus::WrongAnswer),
                ],
            ),
            // Worse overall, but subtask 2 improves on partial credit
            event(
                pid,
                at(11, 0),
                &[
                    (1, 0, JudgeStatus::TimeLimitExceeded),
                    (2, 30, JudgeStatus::WrongAnswer),
                ],
            ),
        ];

        let stat = fold_strict(&cfg, &journal, at(16, 0));
        let entry = &stat.detail[&pid];
        assert_eq!(entry.score, 70);
        assert_eq!(entry.subtasks[&1].score, 40);
        assert_eq!(entry.subtasks[&2].score, 30);
        // Subtask 1's best stays accepted; the worst status among the
        // per-subtask bests is subtask 2's wrong answer
        assert_eq!(entry.subtasks[&1].status, JudgeStatus::Accepted);
        assert_eq!(entry.status, JudgeStatus::WrongAnswer);
    }

    #[test]
    fn test_strict_score_is_monotone_over_the_journal() {
        let pid = Uuid::new_v4();
        let cfg = config("ioi-strict", vec![pid]);
        let mut journal = Vec::new();
        let mut last = 0i64;
        for (minute, subtask_scores) in
            [(10u32, [20i64, 0]), (20, [10, 0]), (30, [20, 50]), (40, [0, 0])]
        {
            journal.push(event(
                pid,
                at(10, minute),
                &[
                    (1, subtask_scores[0], JudgeStatus::WrongAnswer),
                    (2, subtask_scores[1], JudgeStatus::WrongAnswer),
                ],
            ));
            let stat = fold_strict(&cfg, &journal, at(16, 0));
            let score = stat.detail[&pid].score;
            assert!(score >= last, "score dropped from {last} to {score}");
            last = score;
        }
        assert_eq!(last, 70);
    }

    #[test]
    fn test_strict_without_subtask_data_keeps_best_submission() {
        let pid = Uuid::new_v4();
        let cfg = config("ioi-strict", vec![pid]);
        let journal = vec![
            SubmissionEvent {
                id: Uuid::new_v4(),
                pid,
                submitted_at: at(10, 30),
                status: JudgeStatus::WrongAnswer,
                score: 60,
                judge_time_ms: 0,
                subtasks: BTreeMap::new(),
            },
            SubmissionEvent {
                id: Uuid::new_v4(),
                pid,
                submitted_at: at(11, 0),
                status: JudgeStatus::WrongAnswer,
                score: 30,
                judge_time_ms: 0,
                subtasks: BTreeMap::new(),
            },
        ];

        let stat = fold_strict(&cfg, &journal, at(16, 0));
        assert_eq!(stat.detail[&pid].score, 60);
    }

    #[test]
    fn test_strict_subtask_maxima_do_not_bleed_across_problems() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let cfg = config("ioi-strict", vec![p1, p2]);
        let journal = vec![
            event(p1, at(10, 30), &[(1, 100, JudgeStatus::Accepted)]),
            event(p2, at(11, 0), &[(1, 10, JudgeStatus::WrongAnswer)]),
        ];

        let stat = fold_strict(&cfg, &journal, at(16, 0));
        assert_eq!(stat.detail[&p1].score, 100);
        assert_eq!(stat.detail[&p2].score, 10);
    }

    #[test]
    fn test_strict_freeze_hides_merged_gains() {
        let pid = Uuid::new_v4();
        let mut cfg = config("ioi-strict", vec![pid]);
        cfg.lock_at = Some(at(13, 0));
        let journal = vec![
            event(pid, at(11, 0), &[(1, 40, JudgeStatus::WrongAnswer)]),
            event(pid, at(13, 30), &[(2, 60, JudgeStatus::Accepted)]),
        ];

        let stat = fold_strict(&cfg, &journal, at(14, 0));
        assert_eq!(stat.detail[&pid].score, 100);
        assert_eq!(stat.display[&pid].score, 40);
        assert_eq!(stat.display[&pid].pending, 1);
        assert_eq!(stat.agg.score(), 40);
    }
}
