//! Visibility gates over the rule predicates
//!
//! Each gate ORs the rule's lifecycle predicate with a privileged flag,
//! so contest staff see everything while ordinary viewers are held to
//! the rule's schedule. The `require_*` variants turn a denial into a
//! `ScoreError::VisibilityDenied` for callers on an error path.

use chrono::{DateTime, Utc};

use crate::error::{ScoreError, ScoreResult};
use crate::models::ContestConfig;
use crate::rules::ScoringRule;

/// Whether the full scoreboard may be shown to this viewer
pub fn can_show_scoreboard(
    rule: &dyn ScoringRule,
    cfg: &ContestConfig,
    now: DateTime<Utc>,
    privileged: bool,
) -> bool {
    privileged || rule.show_scoreboard(cfg, now)
}

/// Whether another participant's submission records may be shown
pub fn can_show_record(
    rule: &dyn ScoringRule,
    cfg: &ContestConfig,
    now: DateTime<Utc>,
    privileged: bool,
) -> bool {
    privileged || rule.show_record(cfg, now)
}

/// Whether the viewer's own submission records may be shown
pub fn can_show_self_record(
    rule: &dyn ScoringRule,
    cfg: &ContestConfig,
    now: DateTime<Utc>,
    privileged: bool,
) -> bool {
    privileged || rule.show_self_record(cfg, now)
}

pub fn require_show_scoreboard(
    rule: &dyn ScoringRule,
    cfg: &ContestConfig,
    now: DateTime<Utc>,
    privileged: bool,
) -> ScoreResult<()> {
    if can_show_scoreboard(rule, cfg, now, privileged) {
        Ok(())
    } else {
        Err(ScoreError::VisibilityDenied("scoreboard".to_string()))
    }
}

pub fn require_show_record(
    rule: &dyn ScoringRule,
    cfg: &ContestConfig,
    now: DateTime<Utc>,
    privileged: bool,
) -> ScoreResult<()> {
    if can_show_record(rule, cfg, now, privileged) {
        Ok(())
    } else {
        Err(ScoreError::VisibilityDenied("record".to_string()))
    }
}

pub fn require_show_self_record(
    rule: &dyn ScoringRule,
    cfg: &ContestConfig,
    now: DateTime<Utc>,
    privileged: bool,
) -> ScoreResult<()> {
    if can_show_self_record(rule, cfg, now, privileged) {
        Ok(())
    } else {
        Err(ScoreError::VisibilityDenied("self record".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Acm, Oi};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    fn config(rule: &str) -> ContestConfig {
        ContestConfig::new(rule, at(10), at(15), vec![Uuid::new_v4()])
    }

    #[test]
    fn test_acm_scoreboard_visible_once_begun() {
        let cfg = config("acm");
        assert!(!can_show_scoreboard(&Acm, &cfg, at(9), false));
        assert!(can_show_scoreboard(&Acm, &cfg, at(11), false));
        assert!(can_show_scoreboard(&Acm, &cfg, at(16), false));
    }

    #[test]
    fn test_oi_scoreboard_hidden_until_done() {
        let cfg = config("oi");
        assert!(!can_show_scoreboard(&Oi, &cfg, at(11), false));
        assert!(can_show_scoreboard(&Oi, &cfg, at(16), false));
    }

    #[test]
    fn test_privileged_viewer_bypasses_gates() {
        let cfg = config("oi");
        assert!(can_show_scoreboard(&Oi, &cfg, at(9), true));
        assert!(can_show_record(&Oi, &cfg, at(9), true));
        assert!(can_show_self_record(&Oi, &cfg, at(9), true));
    }

    #[test]
    fn test_record_gate_respects_freeze() {
        let mut cfg = config("acm");
        cfg.lock_at = Some(at(14));
        // Done but still locked
        assert!(!can_show_record(&Acm, &cfg, at(16), false));
        cfg.unlocked = true;
        assert!(can_show_record(&Acm, &cfg, at(16), false));
    }

    #[test]
    fn test_require_variants_map_to_errors() {
        let cfg = config("oi");
        assert!(matches!(
            require_show_scoreboard(&Oi, &cfg, at(11), false),
            Err(ScoreError::VisibilityDenied(_))
        ));
        assert!(require_show_scoreboard(&Oi, &cfg, at(16), false).is_ok());
        assert!(matches!(
            require_show_record(&Oi, &cfg, at(11), false),
            Err(ScoreError::VisibilityDenied(_))
        ));
        assert!(require_show_self_record(&Oi, &cfg, at(16), false).is_ok());
    }
}
