//! Domain models

pub mod contest;
pub mod problem;
pub mod scoreboard;
pub mod standing;
pub mod submission;
pub mod user;

pub use contest::ContestConfig;
pub use problem::ProblemMeta;
pub use scoreboard::{
    CellKind, HighlightStyle, RenderOptions, ScoreboardCell, ScoreboardGrid, ScoreboardRow,
};
pub use standing::{ParticipantStanding, ProblemEntry, RuleAggregate, StandingStat};
pub use submission::{JudgeStatus, SubmissionEvent, SubtaskResult, sort_journal};
pub use user::UserInfo;

/// User ID type
pub type UserId = uuid::Uuid;

/// Problem ID type
pub type ProblemId = uuid::Uuid;

/// Submission ID type
pub type SubmissionId = uuid::Uuid;
