//! Manual-override resolution, applied ahead of the heuristic cascade

use crate::classify::{self, Classification};
use crate::extract::{self, extract_identifiers};
use quorum_model::{EntityType, OverrideFeed, Topic, TypeOverride};
use regex::Regex;
use std::sync::OnceLock;

static CIP_CARD_RE: OnceLock<Regex> = OnceLock::new();

/// Applies manually-recorded corrections before and around classification.
/// A topic with an override never enters the heuristic cascade.
pub struct OverrideResolver<'a> {
    feed: Option<&'a OverrideFeed>,
}

impl<'a> OverrideResolver<'a> {
    pub fn new(feed: Option<&'a OverrideFeed>) -> Self {
        Self { feed }
    }

    /// Classify one topic, letting any topic-level override short-circuit
    /// the cascade. Returns the (possibly marked) topic and its
    /// classification.
    pub fn resolve_topic(&self, topic: &Topic) -> (Topic, Classification) {
        let mut topic = topic.clone();

        let forced = self.feed.and_then(|f| f.topic_types.get(&topic.id));
        let mut classification = if let Some(forced) = forced {
            mark(&mut topic, forced.reason.as_deref());
            let identifiers = extract_identifiers(&topic.subject, &topic.content);
            let primary_id =
                classify::primary_id(forced.entity_type, &identifiers, &topic.subject);
            Classification {
                entity_type: forced.entity_type,
                identifiers,
                primary_id,
                network: extract::network_hint(&topic.subject),
            }
        } else {
            classify::classify_topic(&topic)
        };

        self.apply_card_overrides(&mut topic, &mut classification);
        (topic, classification)
    }

    /// Forced type for a whole entity card, keyed by lower-cased primary id
    pub fn entity_type_override(&self, key: &str) -> Option<&'a TypeOverride> {
        self.feed.and_then(|f| f.entity_types.get(key))
    }

    /// Cards an entity's records should be folded into
    pub fn merge_targets(&self, key: &str) -> Option<&'a [String]> {
        self.feed
            .and_then(|f| f.merge_into.get(key))
            .map(|m| m.targets.as_slice())
    }

    /// Reverse direction: entity keys whose records merge into `target`
    pub fn merge_sources(&self, target: &str) -> Vec<&'a str> {
        let Some(feed) = self.feed else {
            return Vec::new();
        };
        feed.merge_into
            .iter()
            .filter(|(_, merge)| merge.targets.iter().any(|t| t.eq_ignore_ascii_case(target)))
            .map(|(source, _)| source.as_str())
            .collect()
    }

    fn apply_card_overrides(&self, topic: &mut Topic, classification: &mut Classification) {
        let Some(feed) = self.feed else {
            return;
        };

        if let Some(moved) = feed.move_topic.get(&topic.id) {
            mark(topic, moved.reason.as_deref());
            classification.primary_id = moved.card.clone();
            // A CIP-shaped target card retypes the topic along with the move
            let cip_card_re =
                CIP_CARD_RE.get_or_init(|| Regex::new(r"^CIP-\d+$").unwrap());
            if cip_card_re.is_match(&moved.card) {
                classification.entity_type = EntityType::Cip;
            }
        } else if let Some(extracted) = feed.extract_to_card.get(&topic.id) {
            mark(topic, extracted.reason.as_deref());
            classification.primary_id = extracted.card.clone();
        }
    }
}

fn mark(topic: &mut Topic, reason: Option<&str>) {
    topic.override_applied = true;
    if topic.override_reason.is_none() {
        topic.override_reason = reason.map(|r| r.to_string());
    }
}
