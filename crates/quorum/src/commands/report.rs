use super::{load_active_votes, load_historical_votes};
use quorum_core::{Pipeline, ReadModels, StageConfig};
use quorum_model::{read_json, FeedKind, TopicsFeed, VoteStatus};
use std::collections::BTreeMap;
use std::path::Path;

pub fn run(topics: &str, active: Option<&str>, history: Option<&str>) -> anyhow::Result<()> {
    let topics_feed: TopicsFeed = read_json(Path::new(topics), FeedKind::Topics)?;
    let active_votes = active.map(load_active_votes).transpose()?;
    let historical_votes = history.map(load_historical_votes).transpose()?;

    let pipeline = Pipeline::new(StageConfig::new());
    let models = pipeline.run(
        Some(&topics_feed),
        active_votes.as_deref(),
        historical_votes.as_deref(),
        None,
    );

    println!("{}", build_report(&models));
    Ok(())
}

fn build_report(models: &ReadModels) -> String {
    if models.topics.is_empty() && models.votes.is_empty() {
        return "No records to report on.".to_string();
    }

    let mut sections = Vec::new();

    // Section 1: Summary
    sections.push(format!(
        "Governance Report\n=================\n\
         Topics: {}\nLifecycle groups: {}\nVote keys: {}",
        models.topics.len(),
        models.groups.len(),
        models.votes.len()
    ));

    // Section 2: Entities by type
    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    for group in &models.groups {
        for item in &group.items {
            *by_type.entry(item.entity_type.as_str()).or_default() += 1;
        }
    }
    let type_lines: Vec<_> = by_type
        .iter()
        .map(|(entity_type, count)| format!("  {}: {}", entity_type, count))
        .collect();
    sections.push(format!(
        "\nEntities by Type\n----------------\n{}",
        type_lines.join("\n")
    ));

    // Section 3: Current stages
    let mut by_stage: BTreeMap<&str, usize> = BTreeMap::new();
    for group in &models.groups {
        for item in &group.items {
            *by_stage.entry(item.current_stage.as_str()).or_default() += 1;
        }
    }
    let stage_lines: Vec<_> = by_stage
        .iter()
        .map(|(stage, count)| format!("  {}: {}", stage, count))
        .collect();
    sections.push(format!(
        "\nCurrent Stages\n--------------\n{}",
        stage_lines.join("\n")
    ));

    // Section 4: Vote outcomes
    if !models.votes.is_empty() {
        let mut tallies: BTreeMap<&str, usize> = BTreeMap::new();
        for items in models.votes.values() {
            for item in items {
                let label = match item.status {
                    VoteStatus::Pending => "pending",
                    VoteStatus::Approved => "approved",
                    VoteStatus::Rejected => "rejected",
                    VoteStatus::Expired => "expired",
                };
                *tallies.entry(label).or_default() += 1;
            }
        }
        let vote_lines: Vec<_> = tallies
            .iter()
            .map(|(status, count)| format!("  {}: {}", status, count))
            .collect();
        sections.push(format!(
            "\nVote Outcomes\n-------------\n{}",
            vote_lines.join("\n")
        ));
    }

    sections.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_model::VoteContract;

    fn sample_models() -> ReadModels {
        let feed: TopicsFeed = serde_json::from_value(serde_json::json!({
            "topics": [
                {
                    "id": "t1",
                    "subject": "CIP-12: fees",
                    "published_at": "2025-01-01T00:00:00Z",
                    "flow": "cip",
                    "posted_stage": "cip-discuss"
                },
                {
                    "id": "t2",
                    "subject": "mainnet: AcmeApp launch",
                    "published_at": "2025-02-01T00:00:00Z",
                    "flow": "shared",
                    "posted_stage": "app-discuss"
                }
            ]
        }))
        .unwrap();
        let active: Vec<VoteContract> = vec![serde_json::from_value(serde_json::json!({
            "contract_id": "c1",
            "payload": {
                "reason": {"body": "mainnet: AcmeApp milestone payout"},
                "action": {"tag": "SRARC_MintUnclaimedRewards", "value": {}},
                "votes": []
            }
        }))
        .unwrap()];
        Pipeline::new(StageConfig::new()).run(Some(&feed), Some(active.as_slice()), None, None)
    }

    #[test]
    fn test_report_has_sections() {
        let report = build_report(&sample_models());
        assert!(report.contains("Governance Report"));
        assert!(report.contains("Entities by Type"));
        assert!(report.contains("Current Stages"));
        assert!(report.contains("Vote Outcomes"));
    }

    #[test]
    fn test_report_counts_types() {
        let report = build_report(&sample_models());
        assert!(report.contains("cip: 1"));
        assert!(report.contains("featured-app: 1"));
        assert!(report.contains("pending: 2"));
    }

    #[test]
    fn test_report_empty() {
        let models = Pipeline::new(StageConfig::new()).run(None, None, None, None);
        assert!(build_report(&models).contains("No records"));
    }
}
