//! Contest standings engine: pluggable scoring rules over submission
//! journals.
//!
//! A `ScoringRule` is a named bundle of lifecycle predicates, a stat
//! fold, and scoreboard builders. Standings are computed per participant
//! from a time-ordered submission journal, ranked with competition
//! ranking, and rendered into a typed cell grid. Freeze windows split
//! every fold into an authoritative `detail` view and a freeze-filtered
//! `display` view, so a locked board hides late results without losing
//! them.
//!
//! # Example
//!
//! ```ignore
//! use themis::prelude::*;
//!
//! let registry = RuleRegistry::builtin();
//! let rule = registry.get(&cfg.rule)?;
//! recompute(rule.as_ref(), &cfg, &mut standing, Utc::now());
//! let (grid, users) = rule
//!     .scoreboard(&opts, &labels, &cfg, &mut problems, standings, &identities, Utc::now())
//!     .await?;
//! ```

pub mod error;
pub mod external;
pub mod models;
pub mod rank;
pub mod rules;
pub mod scoreboard;
pub mod utils;
pub mod visibility;

/// Prelude module - import everything you need with `use themis::prelude::*`
pub mod prelude {
    pub use crate::error::{ScoreError, ScoreResult};
    pub use crate::external::{IdentityProvider, Labeler, PlainLabels, StaticIdentities};
    pub use crate::models::{
        CellKind, ContestConfig, HighlightStyle, JudgeStatus, ParticipantStanding, ProblemEntry,
        ProblemId, ProblemMeta, RenderOptions, RuleAggregate, ScoreboardCell, ScoreboardGrid,
        ScoreboardRow, StandingStat, SubmissionEvent, SubmissionId, SubtaskResult, UserId,
        UserInfo,
    };
    pub use crate::rank::ranked;
    pub use crate::rules::{recompute, RuleRegistry, ScoringRule};
    pub use crate::visibility::{can_show_record, can_show_scoreboard, can_show_self_record};
}

pub use error::{ScoreError, ScoreResult};
pub use rules::{recompute, RuleRegistry, ScoringRule};
