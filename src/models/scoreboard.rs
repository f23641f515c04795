//! Typed scoreboard grid model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::contest::ContestConfig;

/// What a cell renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Rank,
    User,
    Email,
    String,
    Time,
    TotalScore,
    /// Column header bound to a problem id
    Problem,
    /// A participant's result for one problem
    Record,
    /// Two-valued result: frozen contest-time value and final judged value
    Records,
}

/// Highlight applied to a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightStyle {
    /// Contest-wide first accepted submission for the problem
    FirstAccept,
}

/// One typed scoreboard cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreboardCell {
    pub kind: CellKind,
    pub value: String,
    /// Sortable/linkable payload behind the display value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<HighlightStyle>,
}

impl ScoreboardCell {
    pub fn plain(kind: CellKind, value: impl Into<String>) -> Self {
        ScoreboardCell {
            kind,
            value: value.into(),
            raw: None,
            hover: None,
            style: None,
        }
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn with_hover(mut self, hover: impl Into<String>) -> Self {
        self.hover = Some(hover.into());
        self
    }

    pub fn with_style(mut self, style: HighlightStyle) -> Self {
        self.style = Some(style);
        self
    }
}

/// One scoreboard row; the header fixes column count and order
pub type ScoreboardRow = Vec<ScoreboardCell>;

/// Header row plus one row per ranked participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreboardGrid {
    pub header: ScoreboardRow,
    pub rows: Vec<ScoreboardRow>,
}

impl ScoreboardGrid {
    /// Every row matches the header's column count
    pub fn is_rectangular(&self) -> bool {
        self.rows.iter().all(|row| row.len() == self.header.len())
    }
}

/// Render configuration recognized by the scoreboard builders
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Emit identity and penalty detail columns instead of compact cells
    pub is_export: bool,
    /// Override the freeze instant used when selecting display vs detail
    pub lock_at: Option<DateTime<Utc>>,
}

impl RenderOptions {
    pub fn export() -> Self {
        RenderOptions {
            is_export: true,
            lock_at: None,
        }
    }

    /// Freeze instant in effect for this render
    pub fn effective_lock(&self, cfg: &ContestConfig) -> Option<DateTime<Utc>> {
        self.lock_at.or(cfg.lock_at)
    }

    /// Whether this render must read the freeze-filtered view
    pub fn is_locked(&self, cfg: &ContestConfig, now: DateTime<Utc>) -> bool {
        if cfg.unlocked {
            return false;
        }
        self.effective_lock(cfg).is_some_and(|lock_at| now >= lock_at)
    }
}
