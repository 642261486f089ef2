//! Workflow stage vocabulary and pipeline configuration

use quorum_model::EntityType;
use std::collections::HashMap;

/// How fully-identified CIP groups are ordered in the final listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipOrdering {
    /// Most-recent activity first (the default used for all other types)
    ByDate,
    /// CIP number descending
    ByNumber,
}

/// Pipeline configuration: per-type stage vocabulary plus tuning knobs.
///
/// The stage table is the single source of truth for workflow order; the
/// aggregator receives it by value rather than reading a global.
#[derive(Debug, Clone)]
pub struct StageConfig {
    stages: HashMap<EntityType, Vec<String>>,

    /// Minimum confidence before an inferred stage beats the posted stage
    pub min_inferred_confidence: f64,

    /// Accept count at which an in-progress vote counts as approved
    pub approval_threshold: u32,

    pub cip_ordering: CipOrdering,
}

impl StageConfig {
    pub fn new() -> Self {
        let mut stages = HashMap::new();
        stages.insert(
            EntityType::Cip,
            to_vec(&[
                "cip-discuss",
                "cip-vote",
                "cip-announce",
                "sv-announce",
                "sv-onchain-vote",
                "sv-milestone",
            ]),
        );
        stages.insert(
            EntityType::FeaturedApp,
            to_vec(&["app-discuss", "sv-announce", "sv-onchain-vote", "sv-milestone"]),
        );
        stages.insert(
            EntityType::Validator,
            to_vec(&["validator-discuss", "sv-announce", "sv-onchain-vote"]),
        );
        stages.insert(
            EntityType::ProtocolUpgrade,
            to_vec(&["upgrade-discuss", "upgrade-announce", "sv-onchain-vote"]),
        );
        stages.insert(
            EntityType::Outcome,
            to_vec(&["tokenomics", "tokenomics-announce"]),
        );
        stages.insert(EntityType::Other, to_vec(&["other"]));

        Self {
            stages,
            min_inferred_confidence: 0.6,
            approval_threshold: 10,
            cip_ordering: CipOrdering::ByDate,
        }
    }

    /// Ordered stage list for an entity type
    pub fn stages(&self, entity_type: EntityType) -> &[String] {
        self.stages
            .get(&entity_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Initial stage when an entity has no activity yet
    pub fn first_stage(&self, entity_type: EntityType) -> &str {
        self.stages(entity_type)
            .first()
            .map(String::as_str)
            .unwrap_or("other")
    }

    pub fn contains_stage(&self, entity_type: EntityType, stage: &str) -> bool {
        self.stages(entity_type).iter().any(|s| s == stage)
    }

    /// Replace one type's vocabulary (per-deployment customization)
    pub fn set_stages(&mut self, entity_type: EntityType, stages: Vec<String>) {
        self.stages.insert(entity_type, stages);
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn to_vec(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
