//! Feed envelopes, manual-override records, and the per-source error taxonomy

use crate::types::{EntityType, Topic, VoteContract, VoteResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Which logical feed a record or failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedKind {
    Topics,
    ActiveVotes,
    HistoricalVotes,
    Overrides,
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FeedKind::Topics => "topics",
            FeedKind::ActiveVotes => "active-votes",
            FeedKind::HistoricalVotes => "historical-votes",
            FeedKind::Overrides => "overrides",
        };
        write!(f, "{}", name)
    }
}

/// Feed loading failure, distinguishable per source
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to read {feed} feed: {source}")]
    Io {
        feed: FeedKind,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {feed} feed: {source}")]
    Parse {
        feed: FeedKind,
        #[source]
        source: serde_json::Error,
    },
}

impl FeedError {
    pub fn feed(&self) -> FeedKind {
        match self {
            FeedError::Io { feed, .. } | FeedError::Parse { feed, .. } => *feed,
        }
    }
}

/// Aggregate statistics the topics feed may carry alongside its records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicStats {
    pub total: usize,
    #[serde(default)]
    pub by_flow: BTreeMap<String, usize>,
}

/// Topics feed payload; `stale` marks cached data kept after a failed refresh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicsFeed {
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub stats: Option<TopicStats>,
    #[serde(default)]
    pub stale: bool,
}

/// In-progress vote contracts matching the template filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveVotesFeed {
    pub votes: Vec<VoteContract>,
}

/// Archived vote results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoricalVotesFeed {
    pub votes: Vec<VoteResult>,
}

/// Forced entity type, applied ahead of the heuristic cascade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeOverride {
    pub entity_type: EntityType,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Reassignment of a topic to a specific card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardOverride {
    pub card: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Merge of one entity into one or more target cards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeOverride {
    pub targets: Vec<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Manually-applied corrections, consumed (never produced) by the core.
///
/// Map keys: entity overrides are keyed by lower-cased primary id, topic
/// overrides by topic id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverrideFeed {
    #[serde(default)]
    pub entity_types: BTreeMap<String, TypeOverride>,
    #[serde(default)]
    pub topic_types: BTreeMap<String, TypeOverride>,
    #[serde(default)]
    pub extract_to_card: BTreeMap<String, CardOverride>,
    #[serde(default)]
    pub merge_into: BTreeMap<String, MergeOverride>,
    #[serde(default)]
    pub move_topic: BTreeMap<String, CardOverride>,
}

impl OverrideFeed {
    pub fn is_empty(&self) -> bool {
        self.entity_types.is_empty()
            && self.topic_types.is_empty()
            && self.extract_to_card.is_empty()
            && self.merge_into.is_empty()
            && self.move_topic.is_empty()
    }
}

/// Availability of one upstream source at reconciliation time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceHealth {
    pub present: bool,
    pub stale: bool,
}

/// Availability of all three upstream sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceHealthSet {
    pub topics: SourceHealth,
    pub active_votes: SourceHealth,
    pub historical_votes: SourceHealth,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics_feed_defaults() {
        let feed: TopicsFeed = serde_json::from_str(r#"{"topics":[]}"#).unwrap();
        assert!(!feed.stale);
        assert!(feed.stats.is_none());
    }

    #[test]
    fn test_topics_feed_stale_flag() {
        let feed: TopicsFeed =
            serde_json::from_str(r#"{"topics":[],"stale":true,"stats":{"total":12}}"#).unwrap();
        assert!(feed.stale);
        assert_eq!(feed.stats.unwrap().total, 12);
    }

    #[test]
    fn test_override_feed_roundtrip() {
        let json = r#"{
            "entity_types": {"acmeapp": {"entity_type": "validator", "reason": "mislabeled"}},
            "move_topic": {"t9": {"card": "CIP-0042"}}
        }"#;
        let feed: OverrideFeed = serde_json::from_str(json).unwrap();
        assert!(!feed.is_empty());
        assert_eq!(
            feed.entity_types.get("acmeapp").unwrap().entity_type,
            EntityType::Validator
        );
        assert_eq!(feed.move_topic.get("t9").unwrap().card, "CIP-0042");
        assert!(feed.merge_into.is_empty());
    }

    #[test]
    fn test_feed_error_tags_source() {
        let err = FeedError::Io {
            feed: FeedKind::ActiveVotes,
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.feed(), FeedKind::ActiveVotes);
        assert!(err.to_string().contains("active-votes"));
    }
}
