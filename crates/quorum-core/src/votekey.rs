//! Vote-to-entity key mapping for both raw vote shapes

use crate::extract;
use quorum_model::{EntityType, VoteContract, VoteResult, VoteStage};

/// Action-tag vocabularies, matched by substring because the templates are
/// not consistently named across network versions
const MILESTONE_TAGS: &[&str] = &[
    "MintUnclaimed",
    "MintRewards",
    "DistributeRewards",
    "Reward",
    "Coupon",
];
const FEATURED_APP_TAGS: &[&str] = &["FeaturedApp"];
const VALIDATOR_TAGS: &[&str] = &["Validator", "OffboardSv", "OffboardMember"];
const UPGRADE_TAGS: &[&str] = &["Upgrade", "Migration"];

/// The canonical entity association of one raw vote record
#[derive(Debug, Clone, PartialEq)]
pub struct VoteKey {
    pub entity_type: EntityType,
    pub key: String,
    /// Stages the vote belongs to; milestone votes carry two
    pub stages: Vec<VoteStage>,
}

fn tag_matches(tag: &str, vocabulary: &[&str]) -> bool {
    vocabulary.iter().any(|word| tag.contains(word))
}

/// Reward/milestone actions are not consistently tagged, so a milestone word
/// in the reason text counts as a fallback signal
fn is_milestone_vote(tag: &str, lower_text: &str) -> bool {
    tag_matches(tag, MILESTONE_TAGS) || lower_text.contains("milestone")
}

/// Shared resolution for both raw shapes. Returns `None` when the vote
/// cannot be attributed to any tracked entity; that is a drop, not an error.
fn resolve(tag: &str, value: &serde_json::Value, text: &str) -> Option<VoteKey> {
    let lower = text.to_lowercase();
    let milestone = is_milestone_vote(tag, &lower);
    let mut stages = vec![VoteStage::OnchainVote];
    if milestone {
        stages.push(VoteStage::Milestone);
    }

    if let Some(number) = extract::cip_number(text) {
        return Some(VoteKey {
            entity_type: EntityType::Cip,
            key: format!("CIP-{}", number),
            stages,
        });
    }

    // Milestone rewards are always attributed to an app
    if tag_matches(tag, FEATURED_APP_TAGS) || lower.contains("featured app") || milestone {
        let name = extract::app_name_from_value(value).or_else(|| extract::app_name_from_text(text));
        if let Some(name) = name {
            return Some(VoteKey {
                entity_type: EntityType::FeaturedApp,
                key: name.to_lowercase(),
                stages,
            });
        }
    }

    if tag_matches(tag, VALIDATOR_TAGS) || lower.contains("validator") {
        let name = extract::validator_name_from_value(value)
            .or_else(|| extract::validator_name_from_text(text));
        if let Some(name) = name {
            return Some(VoteKey {
                entity_type: EntityType::Validator,
                key: name.to_lowercase(),
                stages,
            });
        }
    }

    if tag_matches(tag, UPGRADE_TAGS) || lower.contains("migration") || lower.contains("splice") {
        let key = extract::version_token(text).unwrap_or_else(|| "upgrade".to_string());
        return Some(VoteKey {
            entity_type: EntityType::ProtocolUpgrade,
            key,
            stages,
        });
    }

    None
}

/// Map an in-progress contract to its entity key and stages
pub fn map_contract(contract: &VoteContract) -> Option<VoteKey> {
    let reason = &contract.payload.reason;
    let text = format!(
        "{} {}",
        reason.body.as_deref().unwrap_or(""),
        reason.url.as_deref().unwrap_or("")
    );
    resolve(&contract.payload.action.tag, &contract.payload.action.value, &text)
}

/// Map a historical result to its entity key and stages; differs from the
/// contract path only in where the reason/action fields live
pub fn map_result(result: &VoteResult) -> Option<VoteKey> {
    let text = format!(
        "{} {} {}",
        result.reason_body.as_deref().unwrap_or(""),
        result.reason_url.as_deref().unwrap_or(""),
        result.action_title.as_deref().unwrap_or("")
    );
    let details = result
        .action_details
        .clone()
        .unwrap_or(serde_json::Value::Null);
    resolve(&result.action_type, &details, &text)
}
