//! Core record types shared across the reconciliation pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle entity kind a topic or vote is reconciled against
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityType {
    Cip,
    FeaturedApp,
    Validator,
    ProtocolUpgrade,
    Outcome,
    Other,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Cip => "cip",
            EntityType::FeaturedApp => "featured-app",
            EntityType::Validator => "validator",
            EntityType::ProtocolUpgrade => "protocol-upgrade",
            EntityType::Outcome => "outcome",
            EntityType::Other => "other",
        }
    }
}

/// Network variant an entity was observed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

/// Forum group/category tag a topic was posted under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flow {
    Cip,
    FeaturedApp,
    Shared,
    Other,
}

/// Stage inferred by the upstream zero-shot classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferredStage {
    pub stage: String,
    pub confidence: f64,
}

/// A single forum post/thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub subject: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub flow: Flow,
    pub posted_stage: String,
    #[serde(default)]
    pub inferred_stage: Option<InferredStage>,
    /// Pre-resolved stage, set upstream when an override was applied
    #[serde(default)]
    pub effective_stage: Option<String>,
    #[serde(default)]
    pub override_applied: bool,
    #[serde(default)]
    pub override_reason: Option<String>,
    #[serde(default)]
    pub llm_classified: bool,
}

impl Topic {
    /// Stage used everywhere downstream: an override-resolved stage wins,
    /// then a sufficiently confident inferred stage, then the posted stage.
    pub fn effective_stage(&self, min_confidence: f64) -> &str {
        if let Some(stage) = &self.effective_stage {
            return stage;
        }
        if let Some(inferred) = &self.inferred_stage {
            if inferred.confidence >= min_confidence {
                return &inferred.stage;
            }
        }
        &self.posted_stage
    }
}

/// Identifiers extracted from a topic's subject and body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicIdentifiers {
    pub cip_number: Option<String>,
    pub app_name: Option<String>,
    pub validator_name: Option<String>,
    pub keywords: Vec<String>,
    pub is_cip_discussion: bool,
}

/// Reason block attached to an on-chain vote request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoteReason {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Tagged action payload of a vote request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteAction {
    pub tag: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// A single Super Validator's ballot on an in-progress vote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvVote {
    pub sv: String,
    /// Accept flag as delivered by the source; seen as a boolean or as a
    /// string in varying casings, so it is kept raw and interpreted lazily
    #[serde(default)]
    pub accept: Option<serde_json::Value>,
    #[serde(default)]
    pub reject: Option<bool>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl SvVote {
    pub fn is_accept(&self) -> bool {
        match &self.accept {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    pub fn is_reject(&self) -> bool {
        if self.reject == Some(true) {
            return true;
        }
        match &self.accept {
            Some(serde_json::Value::Bool(b)) => !*b,
            Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("false"),
            _ => false,
        }
    }
}

/// Payload of an in-progress vote contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotePayload {
    #[serde(default)]
    pub vote_before: Option<DateTime<Utc>>,
    #[serde(default)]
    pub requester: Option<String>,
    #[serde(default)]
    pub reason: VoteReason,
    pub action: VoteAction,
    #[serde(default)]
    pub votes: Vec<SvVote>,
    #[serde(default)]
    pub tracking_cid: Option<String>,
}

/// An in-progress on-chain vote contract (ACS source)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteContract {
    pub contract_id: String,
    pub payload: VotePayload,
    #[serde(default)]
    pub record_time: Option<DateTime<Utc>>,
}

/// A historical (archived) on-chain vote result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResult {
    pub id: String,
    pub action_type: String,
    #[serde(default)]
    pub action_title: Option<String>,
    #[serde(default)]
    pub reason_body: Option<String>,
    #[serde(default)]
    pub reason_url: Option<String>,
    #[serde(default)]
    pub action_details: Option<serde_json::Value>,
    #[serde(default)]
    pub votes_for: u32,
    #[serde(default)]
    pub votes_against: u32,
    #[serde(default)]
    pub total_votes: u32,
    #[serde(default)]
    pub vote_before: Option<DateTime<Utc>>,
    pub outcome: String,
}

/// Which feed a normalized vote item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteSource {
    Acs,
    History,
}

/// Workflow stage a normalized vote item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteStage {
    #[serde(rename = "sv-onchain-vote")]
    OnchainVote,
    #[serde(rename = "sv-milestone")]
    Milestone,
}

impl VoteStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteStage::OnchainVote => "sv-onchain-vote",
            VoteStage::Milestone => "sv-milestone",
        }
    }
}

/// Derived approval state of a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

/// Normalized vote item, the reconciler's output unit.
///
/// A single raw record may be emitted more than once (same `id`, different
/// `stage`) when it qualifies for multiple stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnChainVoteItem {
    pub id: String,
    pub source: VoteSource,
    pub stage: VoteStage,
    pub status: VoteStatus,
    pub votes_for: u32,
    pub votes_against: u32,
    pub total_votes: u32,
    pub deadline: Option<DateTime<Utc>>,
    pub reason_body: Option<String>,
    pub reason_url: Option<String>,
    /// Raw action tag/type, the back-reference into the source record
    pub action: String,
}

/// Canonical aggregate for one lifecycle entity on one network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleItem {
    pub primary_id: String,
    pub entity_type: EntityType,
    pub network: Option<Network>,
    /// Topics bucketed by effective stage, restricted to the type's vocabulary
    pub stage_topics: BTreeMap<String, Vec<Topic>>,
    /// Topics whose stage is outside the type's vocabulary; kept visible
    pub unexpected_topics: Vec<Topic>,
    pub topics: Vec<Topic>,
    pub first_date: Option<DateTime<Utc>>,
    pub last_date: Option<DateTime<Utc>>,
    pub current_stage: String,
    #[serde(default)]
    pub override_applied: bool,
    #[serde(default)]
    pub override_reason: Option<String>,
    #[serde(default)]
    pub llm_classified: bool,
}

/// Network-merged view over lifecycle items sharing a primary id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupedItem {
    pub primary_id: String,
    /// Mainnet variant first
    pub items: Vec<LifecycleItem>,
    pub first_date: Option<DateTime<Utc>>,
    pub last_date: Option<DateTime<Utc>>,
    pub has_multiple_networks: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_backwards_compatible() {
        let old_json = r#"{"id":"t1","subject":"CIP-0001: test","published_at":"2025-01-01T00:00:00Z","flow":"cip","posted_stage":"cip-discuss"}"#;
        let topic: Topic = serde_json::from_str(old_json).unwrap();
        assert!(topic.content.is_empty());
        assert!(topic.inferred_stage.is_none());
        assert!(!topic.override_applied);
        assert_eq!(topic.effective_stage(0.6), "cip-discuss");
    }

    #[test]
    fn test_effective_stage_resolution() {
        let mut topic: Topic = serde_json::from_str(
            r#"{"id":"t1","subject":"s","published_at":"2025-01-01T00:00:00Z","flow":"shared","posted_stage":"other"}"#,
        )
        .unwrap();

        topic.inferred_stage = Some(InferredStage {
            stage: "cip-discuss".to_string(),
            confidence: 0.9,
        });
        assert_eq!(topic.effective_stage(0.6), "cip-discuss");

        // Low confidence falls back to the posted stage
        topic.inferred_stage = Some(InferredStage {
            stage: "cip-discuss".to_string(),
            confidence: 0.3,
        });
        assert_eq!(topic.effective_stage(0.6), "other");

        // Override wins over everything
        topic.effective_stage = Some("sv-announce".to_string());
        assert_eq!(topic.effective_stage(0.6), "sv-announce");
    }

    #[test]
    fn test_sv_vote_accept_variants() {
        let cases = [
            (r#"{"sv":"sv1","accept":true}"#, true, false),
            (r#"{"sv":"sv1","accept":"true"}"#, true, false),
            (r#"{"sv":"sv1","accept":"True"}"#, true, false),
            (r#"{"sv":"sv1","accept":false}"#, false, true),
            (r#"{"sv":"sv1","accept":"False"}"#, false, true),
            (r#"{"sv":"sv1","reject":true}"#, false, true),
            (r#"{"sv":"sv1"}"#, false, false),
        ];
        for (json, accept, reject) in cases {
            let vote: SvVote = serde_json::from_str(json).unwrap();
            assert_eq!(vote.is_accept(), accept, "accept for {}", json);
            assert_eq!(vote.is_reject(), reject, "reject for {}", json);
        }
    }

    #[test]
    fn test_entity_type_serde_kebab() {
        let json = serde_json::to_string(&EntityType::FeaturedApp).unwrap();
        assert_eq!(json, "\"featured-app\"");
        let parsed: EntityType = serde_json::from_str("\"protocol-upgrade\"").unwrap();
        assert_eq!(parsed, EntityType::ProtocolUpgrade);
    }

    #[test]
    fn test_vote_contract_roundtrip() {
        let json = r#"{
            "contract_id": "c1",
            "payload": {
                "vote_before": "2025-06-01T00:00:00Z",
                "requester": "sv-a",
                "reason": {"url": "https://forum/t/1", "body": "mainnet: AcmeApp"},
                "action": {"tag": "SRARC_GrantFeaturedAppRight", "value": {"provider": "AcmeApp"}},
                "votes": [{"sv": "sv-a", "accept": true}]
            },
            "record_time": "2025-05-01T00:00:00Z"
        }"#;
        let contract: VoteContract = serde_json::from_str(json).unwrap();
        assert_eq!(contract.payload.action.tag, "SRARC_GrantFeaturedAppRight");
        assert!(contract.payload.votes[0].is_accept());

        let reencoded = serde_json::to_string(&contract).unwrap();
        let reparsed: VoteContract = serde_json::from_str(&reencoded).unwrap();
        assert_eq!(reparsed.contract_id, contract.contract_id);
    }

    #[test]
    fn test_vote_stage_serde_names() {
        assert_eq!(
            serde_json::to_string(&VoteStage::OnchainVote).unwrap(),
            "\"sv-onchain-vote\""
        );
        assert_eq!(
            serde_json::to_string(&VoteStage::Milestone).unwrap(),
            "\"sv-milestone\""
        );
    }
}
