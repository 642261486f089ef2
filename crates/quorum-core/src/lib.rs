//! Classification, key extraction, and multi-source reconciliation core

mod aggregate;
mod classify;
mod extract;
mod overrides;
mod pipeline;
mod reconcile;
mod stages;
mod votekey;

pub use aggregate::aggregate;
pub use classify::{
    classify_topic, classify_type, is_placeholder_id, primary_id, Classification, ClassifyInput,
    ClassifyRule, DEFAULT_TYPE, RULES,
};
pub use extract::{
    app_name_from_text, app_name_from_value, cip_number, extract_identifiers, network_hint,
    validator_name_from_text, validator_name_from_value, version_token,
};
pub use overrides::OverrideResolver;
pub use pipeline::{ClassifiedTopic, Pipeline, ReadModels};
pub use reconcile::{reconcile, ReconciledVotes};
pub use stages::{CipOrdering, StageConfig};
pub use votekey::{map_contract, map_result, VoteKey};
