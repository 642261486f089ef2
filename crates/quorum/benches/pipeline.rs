use criterion::{Criterion, criterion_group, criterion_main};
use quorum_core::{Pipeline, StageConfig};
use quorum_model::{TopicsFeed, VoteContract, VoteResult};
use std::hint::black_box;

fn synthetic_topics(count: usize) -> TopicsFeed {
    let topics: Vec<_> = (0..count)
        .map(|i| {
            serde_json::json!({
                "id": format!("t{}", i),
                "subject": match i % 4 {
                    0 => format!("CIP-{}: proposal {}", i, i),
                    1 => format!("mainnet: App-{} launch", i),
                    2 => format!("Onboarding validator: node-{}", i),
                    _ => "Weekly operations report".to_string(),
                },
                "published_at": format!("2025-01-{:02}T00:00:00Z", (i % 28) + 1),
                "flow": "shared",
                "posted_stage": "other"
            })
        })
        .collect();
    serde_json::from_value(serde_json::json!({ "topics": topics })).unwrap()
}

fn synthetic_active(count: usize) -> Vec<VoteContract> {
    (0..count)
        .map(|i| {
            serde_json::from_value(serde_json::json!({
                "contract_id": format!("c{}", i),
                "payload": {
                    "vote_before": "2025-06-01T00:00:00Z",
                    "reason": {"body": format!("mainnet: App-{} milestone payout", i)},
                    "action": {"tag": "SRARC_MintUnclaimedRewards", "value": {}},
                    "votes": [{"sv": "sv-1", "accept": true}]
                }
            }))
            .unwrap()
        })
        .collect()
}

fn synthetic_history(count: usize) -> Vec<VoteResult> {
    (0..count)
        .map(|i| {
            serde_json::from_value(serde_json::json!({
                "id": format!("h{}", i),
                "action_type": "SRARC_GrantFeaturedAppRight",
                "reason_body": format!("mainnet: App-{} featured app right", i),
                "votes_for": 12,
                "votes_against": 1,
                "total_votes": 13,
                "vote_before": "2024-06-01T00:00:00Z",
                "outcome": "accepted"
            }))
            .unwrap()
        })
        .collect()
}

fn bench_pipeline_500_records(c: &mut Criterion) {
    let pipeline = Pipeline::new(StageConfig::new());
    let topics = synthetic_topics(300);
    let active = synthetic_active(100);
    let history = synthetic_history(100);

    c.bench_function("pipeline_500_records", |b| {
        b.iter(|| {
            pipeline.run(
                black_box(Some(&topics)),
                black_box(Some(active.as_slice())),
                black_box(Some(history.as_slice())),
                None,
            )
        });
    });
}

criterion_group!(benches, bench_pipeline_500_records);
criterion_main!(benches);
