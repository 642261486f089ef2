//! Lifecycle aggregation: entities, stage buckets, and network-merged groups

use crate::classify::{is_placeholder_id, Classification};
use crate::overrides::OverrideResolver;
use crate::reconcile::ReconciledVotes;
use crate::stages::{CipOrdering, StageConfig};
use chrono::{DateTime, Utc};
use quorum_model::{EntityType, GroupedItem, LifecycleItem, Network, Topic};
use std::collections::BTreeMap;

/// Vote-bearing stages whose presence comes from the reconciled vote map
/// rather than from topics
const VOTE_STAGES: &[&str] = &["sv-onchain-vote", "sv-milestone"];

fn network_rank(network: Option<Network>) -> u8 {
    match network {
        Some(Network::Mainnet) => 0,
        Some(Network::Testnet) => 1,
        None => 2,
    }
}

struct Bucket {
    display_id: String,
    group_key: String,
    network: Option<Network>,
    pending: bool,
    type_counts: BTreeMap<EntityType, usize>,
    topics: Vec<Topic>,
}

/// Build the full lifecycle tree from classified topics and reconciled
/// votes. Rebuilt from scratch on every call; nothing is mutated in place.
pub fn aggregate(
    resolved: &[(Topic, Classification)],
    votes: &ReconciledVotes,
    resolver: &OverrideResolver,
    config: &StageConfig,
) -> Vec<GroupedItem> {
    // Bucket key: (group key, network rank, pending discriminator).
    // Placeholder-id topics get a per-topic discriminator so unassigned
    // records never collapse into one card.
    let mut buckets: BTreeMap<(String, u8, String), Bucket> = BTreeMap::new();

    for (topic, classification) in resolved {
        let lower = classification.primary_id.to_lowercase();
        let pending = is_placeholder_id(&classification.primary_id);

        let targets: Vec<String> = match resolver.merge_targets(&lower) {
            Some(targets) if !pending => targets.iter().map(|t| t.to_lowercase()).collect(),
            _ => vec![lower.clone()],
        };

        for target in targets {
            let display_id = if target == lower {
                classification.primary_id.clone()
            } else {
                target.clone()
            };
            let discriminator = if pending {
                topic.id.clone()
            } else {
                String::new()
            };
            let bucket = buckets
                .entry((target.clone(), network_rank(classification.network), discriminator))
                .or_insert_with(|| Bucket {
                    display_id,
                    group_key: target.clone(),
                    network: classification.network,
                    pending,
                    type_counts: BTreeMap::new(),
                    topics: Vec::new(),
                });
            *bucket
                .type_counts
                .entry(classification.entity_type)
                .or_insert(0) += 1;
            bucket.topics.push(topic.clone());
        }
    }

    // Vote-only entities still surface as cards
    for (key, entity_type) in &votes.key_types {
        let covered = buckets.keys().any(|(group, _, _)| group == key);
        if covered || resolver.merge_targets(key).is_some() {
            continue;
        }
        buckets.insert(
            (key.clone(), network_rank(None), String::new()),
            Bucket {
                display_id: display_for_vote_key(key, *entity_type),
                group_key: key.clone(),
                network: None,
                pending: false,
                type_counts: BTreeMap::from([(*entity_type, 1)]),
                topics: Vec::new(),
            },
        );
    }

    let items: Vec<(bool, LifecycleItem)> = buckets
        .into_values()
        .map(|bucket| (bucket.pending, build_item(bucket, votes, resolver, config)))
        .collect();

    // Network-merge the identified items; pending items stay flat
    let mut groups: BTreeMap<String, GroupedItem> = BTreeMap::new();
    let mut pending_groups: Vec<GroupedItem> = Vec::new();

    for (pending, item) in items {
        if pending {
            pending_groups.push(single_item_group(item));
            continue;
        }
        let key = item.primary_id.to_lowercase();
        let group = groups.entry(key.clone()).or_insert_with(|| GroupedItem {
            primary_id: key,
            items: Vec::new(),
            first_date: None,
            last_date: None,
            has_multiple_networks: false,
        });
        group.items.push(item);
    }

    let mut identified: Vec<GroupedItem> = groups
        .into_values()
        .map(|mut group| {
            group.items.sort_by_key(|item| network_rank(item.network));
            group.first_date = group.items.iter().filter_map(|i| i.first_date).min();
            group.last_date = group.items.iter().filter_map(|i| i.last_date).max();
            let has_mainnet = group
                .items
                .iter()
                .any(|i| i.network == Some(Network::Mainnet));
            let has_testnet = group
                .items
                .iter()
                .any(|i| i.network == Some(Network::Testnet));
            group.has_multiple_networks = has_mainnet && has_testnet;
            group
        })
        .collect();

    sort_identified(&mut identified, config.cip_ordering);

    // Unresolved-id cards first, newest activity first
    pending_groups.sort_by(|a, b| b.last_date.cmp(&a.last_date).then_with(|| a.primary_id.cmp(&b.primary_id)));

    let mut out = pending_groups;
    out.extend(identified);
    out
}

fn build_item(
    bucket: Bucket,
    votes: &ReconciledVotes,
    resolver: &OverrideResolver,
    config: &StageConfig,
) -> LifecycleItem {
    let mut topics = bucket.topics;
    topics.sort_by(|a, b| a.published_at.cmp(&b.published_at).then_with(|| a.id.cmp(&b.id)));

    // Most frequent classified type wins; an entity-level override is
    // authoritative over anything derived
    let mut entity_type = bucket
        .type_counts
        .iter()
        .max_by_key(|(entity_type, count)| (**count, std::cmp::Reverse(**entity_type)))
        .map(|(entity_type, _)| *entity_type)
        .unwrap_or(EntityType::Other);

    let mut override_applied = false;
    let mut override_reason = None;
    if let Some(forced) = resolver.entity_type_override(&bucket.group_key) {
        entity_type = forced.entity_type;
        override_applied = true;
        override_reason = forced.reason.clone();
    }

    // Votes for this card, plus votes from any entity merged into it
    let mut vote_items: Vec<&quorum_model::OnChainVoteItem> =
        votes.items(&bucket.group_key).iter().collect();
    for source in resolver.merge_sources(&bucket.group_key) {
        vote_items.extend(votes.items(source));
    }
    let vocabulary = config.stages(entity_type);

    let mut stage_topics: BTreeMap<String, Vec<Topic>> = BTreeMap::new();
    let mut unexpected_topics = Vec::new();
    for topic in &topics {
        let stage = topic.effective_stage(config.min_inferred_confidence);
        if config.contains_stage(entity_type, stage) {
            stage_topics
                .entry(stage.to_string())
                .or_default()
                .push(topic.clone());
        } else {
            unexpected_topics.push(topic.clone());
        }
    }

    // Last stage with any activity, in the type's own order; topics posted
    // out of order bucket at their own stage without rolling anything back
    let mut current_stage = config.first_stage(entity_type).to_string();
    for stage in vocabulary {
        let topic_activity = stage_topics.get(stage).is_some_and(|t| !t.is_empty());
        let vote_activity = VOTE_STAGES.contains(&stage.as_str())
            && vote_items.iter().any(|v| v.stage.as_str() == stage);
        if topic_activity || vote_activity {
            current_stage = stage.clone();
        }
    }

    let mut dates: Vec<DateTime<Utc>> = topics.iter().map(|t| t.published_at).collect();
    dates.extend(vote_items.iter().filter_map(|v| v.deadline));
    let first_date = dates.iter().min().copied();
    let last_date = dates.iter().max().copied();

    let llm_classified = topics.iter().any(|t| t.llm_classified);
    if !override_applied {
        override_applied = topics.iter().any(|t| t.override_applied);
        override_reason = topics
            .iter()
            .find_map(|t| t.override_reason.clone());
    }

    LifecycleItem {
        primary_id: bucket.display_id,
        entity_type,
        network: bucket.network,
        stage_topics,
        unexpected_topics,
        topics,
        first_date,
        last_date,
        current_stage,
        override_applied,
        override_reason,
        llm_classified,
    }
}

fn single_item_group(item: LifecycleItem) -> GroupedItem {
    GroupedItem {
        primary_id: item.primary_id.to_lowercase(),
        first_date: item.first_date,
        last_date: item.last_date,
        has_multiple_networks: false,
        items: vec![item],
    }
}

fn display_for_vote_key(key: &str, entity_type: EntityType) -> String {
    if entity_type == EntityType::Cip {
        return key.to_uppercase();
    }
    key.to_string()
}

fn sort_identified(groups: &mut Vec<GroupedItem>, ordering: CipOrdering) {
    match ordering {
        CipOrdering::ByDate => {
            groups.sort_by(|a, b| {
                b.last_date
                    .cmp(&a.last_date)
                    .then_with(|| a.primary_id.cmp(&b.primary_id))
            });
        }
        CipOrdering::ByNumber => {
            // CIP groups first, by number descending; everything else keeps
            // the date ordering behind them
            let (mut cips, mut others): (Vec<_>, Vec<_>) = groups
                .drain(..)
                .partition(|g| g.items.first().is_some_and(|i| i.entity_type == EntityType::Cip));
            cips.sort_by(|a, b| {
                cip_group_number(b)
                    .cmp(&cip_group_number(a))
                    .then_with(|| a.primary_id.cmp(&b.primary_id))
            });
            others.sort_by(|a, b| {
                b.last_date
                    .cmp(&a.last_date)
                    .then_with(|| a.primary_id.cmp(&b.primary_id))
            });
            groups.extend(cips);
            groups.extend(others);
        }
    }
}

fn cip_group_number(group: &GroupedItem) -> u32 {
    group
        .primary_id
        .strip_prefix("cip-")
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}
