//! Topic classification: an ordered cascade of heuristic rules

use crate::extract::{self, extract_identifiers};
use quorum_model::{EntityType, Flow, Network, Topic, TopicIdentifiers};
use regex::Regex;
use std::sync::OnceLock;

static TOKENOMICS_RE: OnceLock<Regex> = OnceLock::new();
static UPGRADE_RE: OnceLock<Regex> = OnceLock::new();
static VOTE_PROPOSAL_RE: OnceLock<Regex> = OnceLock::new();
static VALIDATOR_WORD_RE: OnceLock<Regex> = OnceLock::new();
static FEATURED_APP_RE: OnceLock<Regex> = OnceLock::new();
static NET_PREFIX_RE: OnceLock<Regex> = OnceLock::new();

fn upgrade_re() -> &'static Regex {
    UPGRADE_RE.get_or_init(|| {
        Regex::new(
            r"(?i)(synchronizer migration|splice \d+\.\d+|protocol upgrade|network upgrade|hard fork|migration to splice)",
        )
        .unwrap()
    })
}

/// Everything a classification rule may look at
pub struct ClassifyInput<'a> {
    pub subject: &'a str,
    pub flow: Flow,
    pub identifiers: &'a TopicIdentifiers,
}

/// One entry in the classification cascade; first `Some` wins
pub struct ClassifyRule {
    pub name: &'static str,
    pub apply: fn(&ClassifyInput) -> Option<EntityType>,
}

/// The cascade, in decision order. The table is the single source of truth:
/// both classification and any stage-filter path consult it.
pub const RULES: &[ClassifyRule] = &[
    ClassifyRule {
        name: "tokenomics-outcome",
        apply: |input| {
            let re = TOKENOMICS_RE.get_or_init(|| Regex::new(r"(?i)tokenomics outcomes").unwrap());
            re.is_match(input.subject).then_some(EntityType::Outcome)
        },
    },
    ClassifyRule {
        name: "protocol-upgrade-vocabulary",
        apply: |input| {
            upgrade_re()
                .is_match(input.subject)
                .then_some(EntityType::ProtocolUpgrade)
        },
    },
    ClassifyRule {
        name: "flow-tag",
        apply: |input| match input.flow {
            Flow::Cip => Some(EntityType::Cip),
            Flow::FeaturedApp => Some(EntityType::FeaturedApp),
            _ => None,
        },
    },
    ClassifyRule {
        name: "shared-cip",
        apply: |input| {
            if input.flow != Flow::Shared {
                return None;
            }
            let vote_proposal_re =
                VOTE_PROPOSAL_RE.get_or_init(|| Regex::new(r"(?i)vote proposal").unwrap());
            let cip_wording =
                vote_proposal_re.is_match(input.subject) && input.identifiers.is_cip_discussion;
            (input.identifiers.cip_number.is_some() || cip_wording).then_some(EntityType::Cip)
        },
    },
    ClassifyRule {
        name: "shared-validator",
        apply: |input| {
            if input.flow != Flow::Shared {
                return None;
            }
            let validator_re =
                VALIDATOR_WORD_RE.get_or_init(|| Regex::new(r"(?i)validator").unwrap());
            (validator_re.is_match(input.subject) || input.identifiers.validator_name.is_some())
                .then_some(EntityType::Validator)
        },
    },
    ClassifyRule {
        name: "shared-featured-app",
        apply: |input| {
            if input.flow != Flow::Shared {
                return None;
            }
            let featured_re =
                FEATURED_APP_RE.get_or_init(|| Regex::new(r"(?i)featured app").unwrap());
            let net_prefix_re =
                NET_PREFIX_RE.get_or_init(|| Regex::new(r"(?i)^(mainnet|testnet):").unwrap());
            (featured_re.is_match(input.subject)
                || net_prefix_re.is_match(input.subject)
                || input.identifiers.app_name.is_some())
            .then_some(EntityType::FeaturedApp)
        },
    },
];

/// Documented fallback: classification never fails closed
pub const DEFAULT_TYPE: EntityType = EntityType::FeaturedApp;

/// Result of classifying one topic
#[derive(Debug, Clone)]
pub struct Classification {
    pub entity_type: EntityType,
    pub identifiers: TopicIdentifiers,
    pub primary_id: String,
    pub network: Option<Network>,
}

/// Run the cascade over subject + flow + extracted identifiers
pub fn classify_type(subject: &str, flow: Flow, identifiers: &TopicIdentifiers) -> EntityType {
    let input = ClassifyInput {
        subject,
        flow,
        identifiers,
    };
    RULES
        .iter()
        .find_map(|rule| (rule.apply)(&input))
        .unwrap_or(DEFAULT_TYPE)
}

/// Classify a topic and derive its canonical primary id
pub fn classify_topic(topic: &Topic) -> Classification {
    let identifiers = extract_identifiers(&topic.subject, &topic.content);
    let entity_type = classify_type(&topic.subject, topic.flow, &identifiers);
    let primary_id = primary_id(entity_type, &identifiers, &topic.subject);
    let network = extract::network_hint(&topic.subject);

    Classification {
        entity_type,
        identifiers,
        primary_id,
        network,
    }
}

/// Canonical display key per entity type; placeholder ids mark records whose
/// real identifier has not been assigned yet
pub fn primary_id(entity_type: EntityType, identifiers: &TopicIdentifiers, subject: &str) -> String {
    match entity_type {
        EntityType::Cip => identifiers
            .cip_number
            .as_ref()
            .map(|n| format!("CIP-{}", n))
            .unwrap_or_else(|| "cip-unassigned".to_string()),
        EntityType::FeaturedApp => identifiers
            .app_name
            .as_ref()
            .map(|n| n.to_lowercase())
            .unwrap_or_else(|| "app-unassigned".to_string()),
        EntityType::Validator => identifiers
            .validator_name
            .as_ref()
            .map(|n| n.to_lowercase())
            .unwrap_or_else(|| "validator-unassigned".to_string()),
        EntityType::ProtocolUpgrade => extract::version_token(subject)
            .unwrap_or_else(|| "upgrade".to_string()),
        EntityType::Outcome => "tokenomics".to_string(),
        EntityType::Other => "other".to_string(),
    }
}

/// True for ids that stand in for a not-yet-assigned identifier
pub fn is_placeholder_id(id: &str) -> bool {
    id.ends_with("-unassigned")
}
