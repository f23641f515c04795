//! Shared scoreboard assembly helpers
//!
//! The per-rule builders in `rules/` compose these into their header and
//! row layouts.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};

use crate::models::{
    CellKind, ContestConfig, ParticipantStanding, ProblemEntry, ProblemId, ProblemMeta,
    RenderOptions, ScoreboardCell, UserId, UserInfo,
};

/// Spreadsheet-style column label: A..Z, AA, AB, …
pub fn column_label(index: usize) -> String {
    let mut label = Vec::new();
    let mut n = index;
    loop {
        label.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    label.reverse();
    String::from_utf8(label).expect("ASCII label")
}

/// Read-only inputs shared by every row of one scoreboard build
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    /// Contest-wide first accepted-submission instant per problem
    pub first_accept: &'a HashMap<ProblemId, DateTime<Utc>>,
    pub now: DateTime<Utc>,
}

/// Per-problem view a render must read: display while locked, detail
/// otherwise
pub fn render_view<'a>(
    standing: &'a ParticipantStanding,
    cfg: &ContestConfig,
    opts: &RenderOptions,
    now: DateTime<Utc>,
) -> &'a BTreeMap<ProblemId, ProblemEntry> {
    if opts.is_locked(cfg, now) {
        &standing.stat.display
    } else {
        &standing.stat.detail
    }
}

/// First accepted-submission instant per problem, over every participant
///
/// Scans the same view rendering reads, so a frozen board cannot surface a
/// post-freeze first solve.
pub fn first_accept_map<'a>(
    cfg: &ContestConfig,
    opts: &RenderOptions,
    standings: impl IntoIterator<Item = &'a ParticipantStanding>,
    now: DateTime<Utc>,
) -> HashMap<ProblemId, DateTime<Utc>> {
    let mut firsts: HashMap<ProblemId, DateTime<Utc>> = HashMap::new();
    for standing in standings {
        for (pid, entry) in render_view(standing, cfg, opts, now) {
            if !entry.is_accepted() {
                continue;
            }
            firsts
                .entry(*pid)
                .and_modify(|at| *at = (*at).min(entry.submitted_at))
                .or_insert(entry.submitted_at);
        }
    }
    firsts
}

pub(crate) fn rank_cell(rank: usize) -> ScoreboardCell {
    ScoreboardCell::plain(CellKind::Rank, rank.to_string()).with_raw(json!(rank))
}

pub(crate) fn user_cell(user: &UserInfo, user_id: UserId) -> ScoreboardCell {
    ScoreboardCell::plain(CellKind::User, user.display_name.clone())
        .with_raw(json!(user_id.to_string()))
}

/// Export-only identity columns: email, school, real name, student id
pub(crate) fn identity_cells(user: &UserInfo) -> Vec<ScoreboardCell> {
    vec![
        ScoreboardCell::plain(CellKind::Email, user.email.clone().unwrap_or_default()),
        ScoreboardCell::plain(CellKind::String, user.school.clone().unwrap_or_default()),
        ScoreboardCell::plain(CellKind::String, user.real_name.clone().unwrap_or_default()),
        ScoreboardCell::plain(CellKind::String, user.student_id.clone().unwrap_or_default()),
    ]
}

pub(crate) fn identity_header_cells(labels: &dyn crate::external::Labeler) -> Vec<ScoreboardCell> {
    vec![
        ScoreboardCell::plain(CellKind::Email, labels.label("Email")),
        ScoreboardCell::plain(CellKind::String, labels.label("School")),
        ScoreboardCell::plain(CellKind::String, labels.label("Name")),
        ScoreboardCell::plain(CellKind::String, labels.label("Student ID")),
    ]
}

/// Bump a problem's submit/accept counters from one participant's journal
///
/// Post-lock events are skipped while locked: the counters are part of the
/// displayed board and must not leak frozen verdicts.
pub(crate) fn bump_counters(
    cfg: &ContestConfig,
    opts: &RenderOptions,
    problems: &mut HashMap<ProblemId, ProblemMeta>,
    standing: &ParticipantStanding,
    now: DateTime<Utc>,
) {
    let locked = opts.is_locked(cfg, now);
    let lock_at = opts.effective_lock(cfg);
    for event in &standing.journal {
        if !cfg.pids.contains(&event.pid) {
            continue;
        }
        if locked && lock_at.is_some_and(|at| event.submitted_at > at) {
            continue;
        }
        if let Some(meta) = problems.get_mut(&event.pid) {
            meta.n_submit += 1;
            if event.status.is_accepted() {
                meta.n_accept += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::{PlainLabels, StaticIdentities};
    use crate::models::{CellKind, HighlightStyle, JudgeStatus, SubmissionEvent};
    use crate::rules::{RuleRegistry, ScoringRule, recompute};
    use chrono::TimeZone;
    use uuid::Uuid;

    #[test]
    fn test_column_label() {
        assert_eq!(column_label(0), "A");
        assert_eq!(column_label(1), "B");
        assert_eq!(column_label(25), "Z");
        assert_eq!(column_label(26), "AA");
        assert_eq!(column_label(27), "AB");
        assert_eq!(column_label(51), "AZ");
        assert_eq!(column_label(52), "BA");
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn event(pid: ProblemId, when: DateTime<Utc>, status: JudgeStatus) -> SubmissionEvent {
        SubmissionEvent {
            id: Uuid::new_v4(),
            pid,
            submitted_at: when,
            status,
            score: i64::from(status.is_accepted()) * 100,
            judge_time_ms: 0,
            subtasks: BTreeMap::new(),
        }
    }

    fn standing_with(
        rule: &dyn ScoringRule,
        cfg: &ContestConfig,
        events: Vec<SubmissionEvent>,
        now: DateTime<Utc>,
    ) -> ParticipantStanding {
        let mut standing = ParticipantStanding::new(
            Uuid::new_v4(),
            crate::models::RuleAggregate::Acm { accept: 0, time_sec: 0 },
        );
        for event in events {
            standing.push(event);
        }
        recompute(rule, cfg, &mut standing, now);
        standing
    }

    #[tokio::test]
    async fn test_acm_scoreboard_end_to_end() {
        init_tracing();
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let cfg = ContestConfig::new("acm", at(10, 0), at(15, 0), vec![p1, p2]);
        let rule = RuleRegistry::builtin().get("acm").unwrap();
        let now = at(16, 0);

        // Alice solves p1 after one miss; Bob solves both cleanly
        let alice = standing_with(
            rule.as_ref(),
            &cfg,
            vec![
                event(p1, at(10, 20), JudgeStatus::WrongAnswer),
                event(p1, at(10, 40), JudgeStatus::Accepted),
            ],
            now,
        );
        let bob = standing_with(
            rule.as_ref(),
            &cfg,
            vec![
                event(p1, at(10, 30), JudgeStatus::Accepted),
                event(p2, at(11, 0), JudgeStatus::Accepted),
            ],
            now,
        );
        let alice_id = alice.user_id;
        let bob_id = bob.user_id;

        let identities = StaticIdentities(
            [
                (alice_id, UserInfo::named("alice")),
                (bob_id, UserInfo::named("bob")),
            ]
            .into_iter()
            .collect(),
        );

        let opts = RenderOptions::default();
        let mut problems = HashMap::new();
        let (grid, users) = rule
            .scoreboard(
                &opts,
                &PlainLabels,
                &cfg,
                &mut problems,
                vec![alice, bob],
                &identities,
                now,
            )
            .await
            .unwrap();

        assert!(grid.is_rectangular());
        assert_eq!(grid.rows.len(), 2);
        assert_eq!(users.len(), 2);

        // Bob leads with two solves
        assert_eq!(grid.rows[0][0].value, "1");
        assert_eq!(grid.rows[0][1].value, "bob");
        assert_eq!(grid.rows[1][0].value, "2");
        assert_eq!(grid.rows[1][1].value, "alice");

        // Bob's 10:30 accept on p1 beat Alice's and carries the highlight
        let bob_p1 = &grid.rows[0][3];
        assert_eq!(bob_p1.style, Some(HighlightStyle::FirstAccept));
        let alice_p1 = &grid.rows[1][3];
        assert_eq!(alice_p1.value, "+1");
        assert_eq!(alice_p1.style, None);

        // Both participants submitted to p1; counters saw all of it
        assert_eq!(problems[&p1].n_submit, 3);
        assert_eq!(problems[&p1].n_accept, 2);
    }

    #[tokio::test]
    async fn test_export_rows_match_export_header() {
        init_tracing();
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let now = at(16, 0);
        let identities = StaticIdentities::default();
        let opts = RenderOptions::export();

        let cfg = ContestConfig::new("acm", at(10, 0), at(15, 0), vec![p1, p2]);
        let rule = RuleRegistry::builtin().get("acm").unwrap();
        let standing = standing_with(
            rule.as_ref(),
            &cfg,
            vec![event(p1, at(10, 30), JudgeStatus::Accepted)],
            now,
        );
        let mut problems = HashMap::new();
        let (grid, _) = rule
            .scoreboard(
                &opts,
                &PlainLabels,
                &cfg,
                &mut problems,
                vec![standing],
                &identities,
                now,
            )
            .await
            .unwrap();
        assert!(grid.is_rectangular());
        // rank, user, 4 identity, solved, total time, then 2 per problem
        assert_eq!(grid.header.len(), 8 + 2 * 2);

        let mut cfg = ContestConfig::new("homework", at(10, 0), at(20, 0), vec![p1, p2]);
        cfg.penalty_since = Some(at(12, 0));
        cfg.penalty_rules = BTreeMap::from([(24, 0.5)]);
        let rule = RuleRegistry::builtin().get("homework").unwrap();
        let standing = standing_with(
            rule.as_ref(),
            &cfg,
            vec![event(p1, at(13, 0), JudgeStatus::Accepted)],
            at(21, 0),
        );
        let mut problems = HashMap::new();
        let (grid, _) = rule
            .scoreboard(
                &opts,
                &PlainLabels,
                &cfg,
                &mut problems,
                vec![standing],
                &identities,
                at(21, 0),
            )
            .await
            .unwrap();
        assert!(grid.is_rectangular());
        // rank, user, 4 identity, original score, score, then 2 per problem
        assert_eq!(grid.header.len(), 8 + 2 * 2);
    }

    #[tokio::test]
    async fn test_frozen_board_shows_pending_not_verdicts() {
        init_tracing();
        let pid = Uuid::new_v4();
        let mut cfg = ContestConfig::new("acm", at(10, 0), at(15, 0), vec![pid]);
        cfg.lock_at = Some(at(14, 0));
        let now = at(14, 30);
        let rule = RuleRegistry::builtin().get("acm").unwrap();

        let standing = standing_with(
            rule.as_ref(),
            &cfg,
            vec![event(pid, at(14, 10), JudgeStatus::Accepted)],
            now,
        );

        let opts = RenderOptions::default();
        let mut problems = HashMap::new();
        let (grid, _) = rule
            .scoreboard(
                &opts,
                &PlainLabels,
                &cfg,
                &mut problems,
                vec![standing],
                &StaticIdentities::default(),
                now,
            )
            .await
            .unwrap();

        let cell = &grid.rows[0][3];
        assert_eq!(cell.value, "?1");
        assert_eq!(cell.style, None);
        // Solved column shows zero while the accept is frozen
        assert_eq!(grid.rows[0][2].value, "0");
        // Counters skip the frozen event too
        assert_eq!(problems[&pid].n_submit, 0);
    }

    #[tokio::test]
    async fn test_rejudge_divergence_renders_both_scores() {
        init_tracing();
        let pid = Uuid::new_v4();
        let mut cfg = ContestConfig::new("oi", at(10, 0), at(15, 0), vec![pid]);
        cfg.lock_at = Some(at(14, 0));
        cfg.submit_after_accept = Some(false);
        let now = at(16, 0);
        let rule = RuleRegistry::builtin().get("oi").unwrap();

        let mut raised = event(pid, at(14, 30), JudgeStatus::WrongAnswer);
        raised.score = 80;
        let standing = standing_with(
            rule.as_ref(),
            &cfg,
            vec![event(pid, at(11, 0), JudgeStatus::WrongAnswer), raised],
            now,
        );

        let opts = RenderOptions::default();
        let mut problems = HashMap::new();
        let (grid, _) = rule
            .scoreboard(
                &opts,
                &PlainLabels,
                &cfg,
                &mut problems,
                vec![standing],
                &StaticIdentities::default(),
                now,
            )
            .await
            .unwrap();

        let cell = &grid.rows[0][3];
        assert_eq!(cell.kind, CellKind::Records);
        assert_eq!(cell.value, "0 / 80");
        assert_eq!(cell.raw, Some(serde_json::json!([0, 80])));
    }
}
