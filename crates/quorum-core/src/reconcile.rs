//! Merging both vote sources into one normalized, deterministically ordered map

use crate::votekey::{map_contract, map_result};
use quorum_model::{EntityType, OnChainVoteItem, VoteContract, VoteResult, VoteSource, VoteStatus};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use tracing::warn;

/// Output of the reconciler: the per-key vote lists plus the entity type
/// each key resolved to (needed for vote-only lifecycle entities)
#[derive(Debug, Clone, Default)]
pub struct ReconciledVotes {
    pub by_key: BTreeMap<String, Vec<OnChainVoteItem>>,
    pub key_types: BTreeMap<String, EntityType>,
}

impl ReconciledVotes {
    pub fn items(&self, key: &str) -> &[OnChainVoteItem] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Merge in-progress and historical votes, keyed by lower-cased entity key.
///
/// Idempotent and order-stable: the same two input sets always produce the
/// same lists in the same order.
pub fn reconcile(
    active: &[VoteContract],
    historical: &[VoteResult],
    threshold: u32,
) -> ReconciledVotes {
    let mut by_key: BTreeMap<String, Vec<OnChainVoteItem>> = BTreeMap::new();
    let mut key_types: BTreeMap<String, EntityType> = BTreeMap::new();

    for contract in active {
        let Some(vote_key) = map_contract(contract) else {
            warn!(contract_id = %contract.contract_id, "dropping unattributable active vote");
            continue;
        };
        let key = vote_key.key.to_lowercase();
        key_types.entry(key.clone()).or_insert(vote_key.entity_type);
        for stage in &vote_key.stages {
            by_key
                .entry(key.clone())
                .or_default()
                .push(contract_item(contract, *stage, threshold));
        }
    }

    for result in historical {
        let Some(vote_key) = map_result(result) else {
            warn!(id = %result.id, "dropping unattributable historical vote");
            continue;
        };
        let key = vote_key.key.to_lowercase();
        key_types.entry(key.clone()).or_insert(vote_key.entity_type);
        for stage in &vote_key.stages {
            by_key
                .entry(key.clone())
                .or_default()
                .push(result_item(result, *stage));
        }
    }

    for items in by_key.values_mut() {
        // In-progress first, then deadline descending (absent deadlines
        // last), then id as the deterministic tie-break
        items.sort_by(|a, b| {
            a.source
                .cmp(&b.source)
                .then_with(|| Reverse(a.deadline).cmp(&Reverse(b.deadline)))
                .then_with(|| a.id.cmp(&b.id))
        });
    }

    ReconciledVotes { by_key, key_types }
}

fn contract_item(
    contract: &VoteContract,
    stage: quorum_model::VoteStage,
    threshold: u32,
) -> OnChainVoteItem {
    let votes = &contract.payload.votes;
    let votes_for = votes.iter().filter(|v| v.is_accept()).count() as u32;
    let votes_against = votes.iter().filter(|v| v.is_reject()).count() as u32;

    // An ACS contract is by definition not yet finalized: a past deadline
    // stays pending until archival, it never reads as expired or rejected
    let status = if votes_for >= threshold {
        VoteStatus::Approved
    } else {
        VoteStatus::Pending
    };

    OnChainVoteItem {
        id: contract.contract_id.clone(),
        source: VoteSource::Acs,
        stage,
        status,
        votes_for,
        votes_against,
        total_votes: votes.len() as u32,
        deadline: contract.payload.vote_before,
        reason_body: contract.payload.reason.body.clone(),
        reason_url: contract.payload.reason.url.clone(),
        action: contract.payload.action.tag.clone(),
    }
}

fn result_item(result: &VoteResult, stage: quorum_model::VoteStage) -> OnChainVoteItem {
    let status = match result.outcome.to_lowercase().as_str() {
        "accepted" => VoteStatus::Approved,
        "rejected" => VoteStatus::Rejected,
        _ => VoteStatus::Expired,
    };

    OnChainVoteItem {
        id: result.id.clone(),
        source: VoteSource::History,
        stage,
        status,
        votes_for: result.votes_for,
        votes_against: result.votes_against,
        total_votes: result.total_votes,
        deadline: result.vote_before,
        reason_body: result.reason_body.clone(),
        reason_url: result.reason_url.clone(),
        action: result.action_type.clone(),
    }
}
