//! Problem metadata as supplied by the problem-lookup collaborator

use serde::{Deserialize, Serialize};

/// Problem title plus the scoreboard's per-problem counters
///
/// `scoreboard_header` resets the counters; `scoreboard_row` increments
/// them while scanning each participant's journal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProblemMeta {
    pub title: String,
    pub n_submit: u32,
    pub n_accept: u32,
}

impl ProblemMeta {
    pub fn new(title: impl Into<String>) -> Self {
        ProblemMeta {
            title: title.into(),
            n_submit: 0,
            n_accept: 0,
        }
    }

    pub fn reset_counters(&mut self) {
        self.n_submit = 0;
        self.n_accept = 0;
    }
}
