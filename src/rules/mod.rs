//! Scoring rules: the pluggable policy bundles
//!
//! A rule is a named bundle of predicates, a stat fold, and scoreboard
//! builders behind the `ScoringRule` capability trait. Composite
//! operations (`scoreboard`, `ranked`) are default trait methods written
//! against `self`, so a rule overriding only `scoreboard_row` still has
//! its override invoked from the shared `scoreboard`. Derived rules
//! delegate to their base rule's fold/builder functions, resolved at
//! compile time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ScoreError, ScoreResult};
use crate::external::{IdentityProvider, Labeler};
use crate::models::submission::sort_journal;
use crate::models::{
    ContestConfig, ParticipantStanding, ProblemId, ProblemMeta, RenderOptions, ScoreboardGrid,
    ScoreboardRow, StandingStat, SubmissionEvent, UserId, UserInfo,
};
use crate::rank;
use crate::scoreboard::{RowContext, first_accept_map};

pub mod acm;
pub mod homework;
pub mod ioi;
pub mod ledo;
pub mod oi;

pub use acm::Acm;
pub use homework::Homework;
pub use ioi::{Ioi, IoiStrict};
pub use ledo::Ledo;
pub use oi::Oi;

/// Capability interface every scoring policy implements
#[async_trait]
pub trait ScoringRule: Send + Sync {
    /// Registry key selecting this rule
    fn key(&self) -> &'static str;

    /// Human-readable display label
    fn label(&self) -> &'static str;

    /// Excluded from visible-rule-list queries
    fn hidden(&self) -> bool {
        false
    }

    /// Default for folding submissions after a problem is accepted;
    /// `ContestConfig::submit_after_accept` overrides it
    fn submit_after_accept(&self) -> bool {
        false
    }

    /// Validate a proposed configuration for this rule
    fn check(&self, cfg: &ContestConfig) -> ScoreResult<()> {
        cfg.validate_base()
    }

    /// Standings sort key used before ranking
    fn compare(&self, a: &ParticipantStanding, b: &ParticipantStanding) -> Ordering;

    /// Tie predicate over the sort key
    fn tied(&self, a: &ParticipantStanding, b: &ParticipantStanding) -> bool;

    fn show_scoreboard(&self, cfg: &ContestConfig, now: DateTime<Utc>) -> bool;

    fn show_self_record(&self, cfg: &ContestConfig, now: DateTime<Utc>) -> bool;

    fn show_record(&self, cfg: &ContestConfig, now: DateTime<Utc>) -> bool;

    /// Fold a time-ordered journal into this rule's aggregate and the
    /// detail/display views
    ///
    /// The journal must already be ordered by submission instant.
    fn stat(
        &self,
        cfg: &ContestConfig,
        journal: &[SubmissionEvent],
        now: DateTime<Utc>,
    ) -> StandingStat;

    /// Build the header row, resetting each problem's submit/accept
    /// counters
    fn scoreboard_header(
        &self,
        opts: &RenderOptions,
        labels: &dyn Labeler,
        cfg: &ContestConfig,
        problems: &mut HashMap<ProblemId, ProblemMeta>,
    ) -> ScoreboardRow;

    /// Build one participant's row, incrementing the per-problem counters
    #[allow(clippy::too_many_arguments)]
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
    ) -> ScoreboardRow;

    /// Sort and rank standings by this rule's key with competition ranking
    fn ranked(
        &self,
        mut standings: Vec<ParticipantStanding>,
    ) -> Vec<(usize, ParticipantStanding)> {
        standings.sort_by(|a, b| self.compare(a, b));
        rank::ranked(standings, |a, b| self.tied(a, b))
    }

    /// Assemble the full grid: rank, resolve identities, compute first
    /// accepts, then header plus one independent row per participant
    #[allow(clippy::too_many_arguments)]
    async fn scoreboard(
        &self,
        opts: &RenderOptions,
        labels: &dyn Labeler,
        cfg: &ContestConfig,
        problems: &mut HashMap<ProblemId, ProblemMeta>,
        standings: Vec<ParticipantStanding>,
        identities: &dyn IdentityProvider,
        now: DateTime<Utc>,
    ) -> ScoreResult<(ScoreboardGrid, HashMap<UserId, UserInfo>)> {
        let ranked = self.ranked(standings);
        tracing::debug!(
            rule = self.key(),
            participants = ranked.len(),
            export = opts.is_export,
            "building scoreboard"
        );

        let ids: Vec<UserId> = ranked.iter().map(|(_, s)| s.user_id).collect();
        let users = identities.users(&ids).await?;

        let first_accept = first_accept_map(cfg, opts, ranked.iter().map(|(_, s)| s), now);
        let ctx = RowContext {
            first_accept: &first_accept,
            now,
        };

        let header = self.scoreboard_header(opts, labels, cfg, problems);
        let mut rows = Vec::with_capacity(ranked.len());
        for (rank, standing) in &ranked {
            let user = users.get(&standing.user_id).cloned().unwrap_or_default();
            rows.push(self.scoreboard_row(
                opts, labels, cfg, problems, &user, *rank, standing, &ctx,
            ));
        }
        Ok((ScoreboardGrid { header, rows }, users))
    }
}

/// Recompute a standing from its full journal
///
/// Restores journal order, re-runs the rule's stat fold, and bumps the
/// revision. Safe to re-run at any time; the result depends only on the
/// journal, configuration, and `now`.
pub fn recompute(
    rule: &dyn ScoringRule,
    cfg: &ContestConfig,
    standing: &mut ParticipantStanding,
    now: DateTime<Utc>,
) {
    sort_journal(&mut standing.journal);
    standing.stat = rule.stat(cfg, &standing.journal, now);
    standing.rev += 1;
    tracing::debug!(
        rule = rule.key(),
        user = %standing.user_id,
        rev = standing.rev,
        "recomputed standing"
    );
}

/// Freeze state a stat fold evaluates entries against
#[derive(Debug, Clone, Copy)]
pub(crate) struct Freeze {
    locked: bool,
    lock_at: Option<DateTime<Utc>>,
}

impl Freeze {
    pub(crate) fn of(cfg: &ContestConfig, now: DateTime<Utc>) -> Self {
        Freeze {
            locked: cfg.is_locked(now),
            lock_at: cfg.lock_at,
        }
    }

    /// Whether a submission at `at` is hidden from the display view
    pub(crate) fn hides(&self, at: DateTime<Utc>) -> bool {
        self.locked && self.lock_at.is_some_and(|lock_at| at > lock_at)
    }

    /// Clamp an instant to the freeze boundary
    ///
    /// Pending placeholders carry this instead of the frozen event's own
    /// instant; the display view must not expose a post-lock timestamp.
    pub(crate) fn clamp(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        match self.lock_at {
            Some(lock_at) => at.min(lock_at),
            None => at,
        }
    }
}

/// Named registry of scoring rules
pub struct RuleRegistry {
    rules: HashMap<&'static str, Arc<dyn ScoringRule>>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RuleRegistry {
    /// Empty registry
    pub fn new() -> Self {
        RuleRegistry {
            rules: HashMap::new(),
        }
    }

    /// Registry holding the six built-in rules
    pub fn builtin() -> Self {
        let mut registry = RuleRegistry::new();
        registry.register(Arc::new(Acm));
        registry.register(Arc::new(Oi));
        registry.register(Arc::new(Ioi));
        registry.register(Arc::new(IoiStrict));
        registry.register(Arc::new(Ledo));
        registry.register(Arc::new(Homework));
        registry
    }

    pub fn register(&mut self, rule: Arc<dyn ScoringRule>) {
        self.rules.insert(rule.key(), rule);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rules.contains_key(key)
    }

    /// Look up a rule by key
    pub fn get(&self, key: &str) -> ScoreResult<Arc<dyn ScoringRule>> {
        self.rules
            .get(key)
            .cloned()
            .ok_or_else(|| ScoreError::UnknownRule(key.to_string()))
    }

    /// Keys of every non-hidden rule, sorted for stable listings
    pub fn visible(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = self
            .rules
            .values()
            .filter(|rule| !rule.hidden())
            .map(|rule| rule.key())
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Validate a proposed configuration against its rule
    pub fn check(&self, cfg: &ContestConfig) -> ScoreResult<()> {
        self.get(&cfg.rule)?.check(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_builtin_registry() {
        let registry = RuleRegistry::builtin();
        for key in ["acm", "oi", "ioi", "ioi-strict", "ledo", "homework"] {
            assert!(registry.contains(key), "missing rule {key}");
        }
        assert!(registry.get("codeforces").is_err());
    }

    #[test]
    fn test_hidden_rules_not_listed() {
        let registry = RuleRegistry::builtin();
        let visible = registry.visible();
        assert!(!visible.contains(&"homework"));
        assert_eq!(visible, vec!["acm", "ioi", "ioi-strict", "ledo", "oi"]);
    }

    #[test]
    fn test_registry_check_unknown_rule() {
        let registry = RuleRegistry::builtin();
        let cfg = ContestConfig::new("codeforces", at(10), at(15), vec![Uuid::new_v4()]);
        assert!(matches!(
            registry.check(&cfg),
            Err(ScoreError::UnknownRule(_))
        ));
    }

    #[test]
    fn test_recompute_sorts_and_bumps_rev() {
        use crate::models::{JudgeStatus, RuleAggregate};
        use std::collections::BTreeMap;

        let cfg = ContestConfig::new("oi", at(10), at(15), vec![Uuid::new_v4()]);
        let pid = cfg.pids[0];
        let mut standing =
            ParticipantStanding::new(Uuid::new_v4(), RuleAggregate::Oi { score: 0 });
        // Deliberately out of order
        for (minutes, score) in [(40i64, 60), (10, 30)] {
            standing.journal.push(SubmissionEvent {
                id: Uuid::new_v4(),
                pid,
                submitted_at: at(10) + chrono::Duration::minutes(minutes),
                status: JudgeStatus::WrongAnswer,
                score,
                judge_time_ms: 0,
                subtasks: BTreeMap::new(),
            });
        }

        recompute(&Oi, &cfg, &mut standing, at(16));
        assert_eq!(standing.rev, 1);
        assert_eq!(standing.stat.agg.score(), 60);
        assert!(standing.journal[0].submitted_at < standing.journal[1].submitted_at);

        let before = standing.stat.clone();
        recompute(&Oi, &cfg, &mut standing, at(16));
        assert_eq!(standing.rev, 2);
        assert_eq!(
            serde_json::to_value(&standing.stat).unwrap(),
            serde_json::to_value(&before).unwrap()
        );
    }
}
