//! Collaborator interfaces
//!
//! The engine never performs storage or network I/O itself; identity and
//! translation lookups come through these narrow seams, supplied by the
//! caller and awaited as synchronous external calls.

use async_trait::async_trait;
use futures::future::try_join_all;
use std::collections::HashMap;

use crate::error::ScoreResult;
use crate::models::{UserId, UserInfo};

/// Participant identity lookup
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve one participant's display identity
    async fn user(&self, id: UserId) -> ScoreResult<UserInfo>;

    /// Resolve a batch of participants
    ///
    /// The default fans out per-id lookups concurrently; providers with a
    /// real batch primitive should override it.
    async fn users(&self, ids: &[UserId]) -> ScoreResult<HashMap<UserId, UserInfo>> {
        let infos = try_join_all(ids.iter().map(|id| self.user(*id))).await?;
        Ok(ids.iter().copied().zip(infos).collect())
    }
}

/// Pre-materialized identities, for callers that already fetched them
/// (and for tests)
#[derive(Debug, Clone, Default)]
pub struct StaticIdentities(pub HashMap<UserId, UserInfo>);

#[async_trait]
impl IdentityProvider for StaticIdentities {
    async fn user(&self, id: UserId) -> ScoreResult<UserInfo> {
        Ok(self.0.get(&id).cloned().unwrap_or_default())
    }
}

/// Label/translation lookup with positional formatting
pub trait Labeler: Send + Sync {
    /// Translate a label key
    fn label(&self, key: &str) -> String;

    /// Translate and substitute `{0}`, `{1}`, … placeholders
    fn format(&self, key: &str, args: &[&str]) -> String {
        let mut out = self.label(key);
        for (i, arg) in args.iter().enumerate() {
            out = out.replace(&format!("{{{i}}}"), arg);
        }
        out
    }
}

/// Identity labeler: every key renders as itself
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainLabels;

impl Labeler for PlainLabels {
    fn label(&self, key: &str) -> String {
        key.to_string()
    }
}
