use super::{load_active_votes, load_historical_votes};
use quorum_core::{Pipeline, ReadModels, StageConfig};
use quorum_model::{read_json, write_json, FeedKind, OverrideFeed, TopicsFeed};
use std::path::Path;

pub fn run(
    topics: &str,
    active: Option<&str>,
    history: Option<&str>,
    overrides: Option<&str>,
    json: bool,
    out: Option<&str>,
) -> anyhow::Result<()> {
    let topics_feed: TopicsFeed = read_json(Path::new(topics), FeedKind::Topics)?;
    let active_votes = active.map(load_active_votes).transpose()?;
    let historical_votes = history.map(load_historical_votes).transpose()?;
    let override_feed: Option<OverrideFeed> = overrides
        .map(|p| read_json(Path::new(p), FeedKind::Overrides))
        .transpose()?;

    let pipeline = Pipeline::new(StageConfig::new());
    let models = pipeline.run(
        Some(&topics_feed),
        active_votes.as_deref(),
        historical_votes.as_deref(),
        override_feed.as_ref(),
    );

    if let Some(out) = out {
        write_json(Path::new(out), &models)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
    } else {
        println!("{}", build_summary(&models));
    }
    Ok(())
}

fn build_summary(models: &ReadModels) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "Reconciled {} topics into {} groups ({} vote keys)",
        models.topics.len(),
        models.groups.len(),
        models.votes.len()
    ));
    if models.sources.topics.stale {
        lines.push("  (topics feed is stale: refresh failed, cached data kept)".to_string());
    }
    lines.push(String::new());

    for group in &models.groups {
        let item = match group.items.first() {
            Some(item) => item,
            None => continue,
        };
        let networks = if group.has_multiple_networks {
            " [mainnet+testnet]"
        } else {
            ""
        };
        let votes = models.votes.get(&group.primary_id).map_or(0, Vec::len);
        let topics: usize = group.items.iter().map(|i| i.topics.len()).sum();
        let flags = if group.items.iter().any(|i| i.override_applied) {
            " *override"
        } else {
            ""
        };
        let last = group
            .last_date
            .map(|d| format!(" last:{}", d.format("%Y-%m-%d")))
            .unwrap_or_default();
        lines.push(format!(
            "  {} ({}) | stage:{} topics:{} votes:{}{}{}{}",
            item.primary_id,
            item.entity_type.as_str(),
            item.current_stage,
            topics,
            votes,
            last,
            networks,
            flags,
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_core::{Pipeline, StageConfig};

    fn models() -> ReadModels {
        let feed: TopicsFeed = serde_json::from_value(serde_json::json!({
            "topics": [{
                "id": "t1",
                "subject": "CIP-12: fees",
                "published_at": "2025-01-01T00:00:00Z",
                "flow": "cip",
                "posted_stage": "cip-discuss"
            }]
        }))
        .unwrap();
        Pipeline::new(StageConfig::new()).run(Some(&feed), None, None, None)
    }

    #[test]
    fn test_summary_lists_groups() {
        let summary = build_summary(&models());
        assert!(summary.contains("1 groups"));
        assert!(summary.contains("CIP-0012 (cip)"));
        assert!(summary.contains("stage:cip-discuss"));
    }

    #[test]
    fn test_run_loads_feed_files() {
        let temp = tempfile::TempDir::new().unwrap();
        let topics_path = temp.path().join("topics.json");
        std::fs::write(
            &topics_path,
            serde_json::json!({
                "topics": [{
                    "id": "t1",
                    "subject": "mainnet: AcmeApp launch",
                    "published_at": "2025-01-01T00:00:00Z",
                    "flow": "shared",
                    "posted_stage": "app-discuss"
                }]
            })
            .to_string(),
        )
        .unwrap();

        let active_path = temp.path().join("active.jsonl");
        std::fs::write(
            &active_path,
            format!(
                "{}\n",
                serde_json::json!({
                    "contract_id": "c1",
                    "payload": {
                        "reason": {"body": "mainnet: AcmeApp milestone payout"},
                        "action": {"tag": "SRARC_MintUnclaimedRewards", "value": {}},
                        "votes": []
                    }
                })
            ),
        )
        .unwrap();

        let out_path = temp.path().join("models.json");
        let result = run(
            topics_path.to_str().unwrap(),
            Some(active_path.to_str().unwrap()),
            None,
            None,
            false,
            Some(out_path.to_str().unwrap()),
        );
        assert!(result.is_ok());
        assert!(out_path.exists());
    }

    #[test]
    fn test_run_missing_topics_is_error() {
        let result = run("/nonexistent/topics.json", None, None, None, false, None);
        assert!(result.is_err());
    }
}
