//! Full reconciliation pass: feeds in, read models out

use crate::aggregate::aggregate;
use crate::overrides::OverrideResolver;
use crate::reconcile::reconcile;
use crate::stages::StageConfig;
use quorum_model::{
    EntityType, GroupedItem, Network, OnChainVoteItem, OverrideFeed, SourceHealth,
    SourceHealthSet, Topic, TopicsFeed, VoteContract, VoteResult,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// One topic with its resolved classification, for the flat read model
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedTopic {
    pub entity_type: EntityType,
    pub primary_id: String,
    pub network: Option<Network>,
    pub topic: Topic,
}

/// The three read models handed to presentation, derivable purely from the
/// feed inputs with no further calls
#[derive(Debug, Clone, Serialize)]
pub struct ReadModels {
    pub groups: Vec<GroupedItem>,
    pub topics: Vec<ClassifiedTopic>,
    pub votes: BTreeMap<String, Vec<OnChainVoteItem>>,
    pub sources: SourceHealthSet,
}

/// Synchronous reconciliation pipeline. Each `run` recomputes everything
/// from scratch; a stale result is simply superseded by the next one.
pub struct Pipeline {
    config: StageConfig,
}

impl Pipeline {
    pub fn new(config: StageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Run the full pass. Any source may be absent; the pipeline still
    /// classifies and aggregates whatever is available.
    pub fn run(
        &self,
        topics: Option<&TopicsFeed>,
        active: Option<&[VoteContract]>,
        historical: Option<&[VoteResult]>,
        overrides: Option<&OverrideFeed>,
    ) -> ReadModels {
        let resolver = OverrideResolver::new(overrides);

        let topic_records: &[Topic] = topics.map(|f| f.topics.as_slice()).unwrap_or(&[]);
        let resolved: Vec<_> = topic_records
            .iter()
            .map(|t| resolver.resolve_topic(t))
            .collect();
        debug!(topics = resolved.len(), "classified topics");

        let reconciled = reconcile(
            active.unwrap_or(&[]),
            historical.unwrap_or(&[]),
            self.config.approval_threshold,
        );
        debug!(keys = reconciled.by_key.len(), "reconciled votes");

        let groups = aggregate(&resolved, &reconciled, &resolver, &self.config);
        debug!(groups = groups.len(), "aggregated lifecycle groups");

        let classified = resolved
            .into_iter()
            .map(|(topic, classification)| ClassifiedTopic {
                entity_type: classification.entity_type,
                primary_id: classification.primary_id,
                network: classification.network,
                topic,
            })
            .collect();

        let sources = SourceHealthSet {
            topics: SourceHealth {
                present: topics.is_some(),
                stale: topics.is_some_and(|f| f.stale),
            },
            active_votes: SourceHealth {
                present: active.is_some(),
                stale: false,
            },
            historical_votes: SourceHealth {
                present: historical.is_some(),
                stale: false,
            },
        };

        ReadModels {
            groups,
            topics: classified,
            votes: reconciled.by_key,
            sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed() -> TopicsFeed {
        serde_json::from_value(serde_json::json!({
            "topics": [
                {
                    "id": "t1",
                    "subject": "CIP-42: Treasury rework",
                    "published_at": "2025-01-10T00:00:00Z",
                    "flow": "cip",
                    "posted_stage": "cip-discuss"
                },
                {
                    "id": "t2",
                    "subject": "mainnet: AcmeApp launch",
                    "published_at": "2025-02-10T00:00:00Z",
                    "flow": "shared",
                    "posted_stage": "app-discuss"
                }
            ]
        }))
        .unwrap()
    }

    fn active_votes() -> Vec<VoteContract> {
        vec![serde_json::from_value(serde_json::json!({
            "contract_id": "c1",
            "payload": {
                "vote_before": "2025-03-01T00:00:00Z",
                "reason": {"body": "mainnet: AcmeApp milestone payout"},
                "action": {"tag": "SRARC_MintUnclaimedRewards", "value": {}},
                "votes": [{"sv": "sv-1", "accept": true}]
            }
        }))
        .unwrap()]
    }

    #[test]
    fn test_runs_with_all_sources() {
        let pipeline = Pipeline::new(StageConfig::new());
        let feed = feed();
        let active = active_votes();
        let models = pipeline.run(Some(&feed), Some(active.as_slice()), Some(&[]), None);

        assert_eq!(models.topics.len(), 2);
        assert_eq!(models.groups.len(), 2);
        assert_eq!(models.votes["acmeapp"].len(), 2);
        assert!(models.sources.topics.present);
        assert!(models.sources.historical_votes.present);
    }

    #[test]
    fn test_runs_with_missing_vote_sources() {
        let pipeline = Pipeline::new(StageConfig::new());
        let feed = feed();
        let models = pipeline.run(Some(&feed), None, None, None);

        assert_eq!(models.topics.len(), 2);
        assert!(models.votes.is_empty());
        assert!(!models.sources.active_votes.present);
        assert!(!models.sources.historical_votes.present);
    }

    #[test]
    fn test_runs_with_no_sources_at_all() {
        let pipeline = Pipeline::new(StageConfig::new());
        let models = pipeline.run(None, None, None, None);
        assert!(models.groups.is_empty());
        assert!(models.topics.is_empty());
        assert!(!models.sources.topics.present);
    }

    #[test]
    fn test_stale_flag_propagates() {
        let pipeline = Pipeline::new(StageConfig::new());
        let mut feed = feed();
        feed.stale = true;
        let models = pipeline.run(Some(&feed), None, None, None);
        assert!(models.sources.topics.present);
        assert!(models.sources.topics.stale);
    }

    #[test]
    fn test_output_is_deterministic() {
        let pipeline = Pipeline::new(StageConfig::new());
        let feed = feed();
        let active = active_votes();

        let first = serde_json::to_string(&pipeline.run(Some(&feed), Some(active.as_slice()), Some(&[]), None))
            .unwrap();
        let second = serde_json::to_string(&pipeline.run(Some(&feed), Some(active.as_slice()), Some(&[]), None))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_flat_list_carries_classification() {
        let pipeline = Pipeline::new(StageConfig::new());
        let feed = feed();
        let models = pipeline.run(Some(&feed), None, None, None);

        let by_id: std::collections::BTreeMap<_, _> = models
            .topics
            .iter()
            .map(|t| (t.topic.id.as_str(), t))
            .collect();
        assert_eq!(by_id["t1"].entity_type, EntityType::Cip);
        assert_eq!(by_id["t1"].primary_id, "CIP-0042");
        assert_eq!(by_id["t2"].entity_type, EntityType::FeaturedApp);
        assert_eq!(by_id["t2"].network, Some(Network::Mainnet));
    }
}
