pub mod classify;
pub mod reconcile;
pub mod report;
pub mod version;

use anyhow::Result;
use quorum_model::{read_json, read_jsonl, FeedKind, VoteContract, VoteResult};
use std::path::Path;

/// Active votes arrive either as a feed envelope (JSON) or a raw record
/// dump (JSONL)
pub fn load_active_votes(path: &str) -> Result<Vec<VoteContract>> {
    let path = Path::new(path);
    if path.extension().is_some_and(|ext| ext == "jsonl") {
        Ok(read_jsonl(path, FeedKind::ActiveVotes)?)
    } else {
        let feed: quorum_model::ActiveVotesFeed = read_json(path, FeedKind::ActiveVotes)?;
        Ok(feed.votes)
    }
}

pub fn load_historical_votes(path: &str) -> Result<Vec<VoteResult>> {
    let path = Path::new(path);
    if path.extension().is_some_and(|ext| ext == "jsonl") {
        Ok(read_jsonl(path, FeedKind::HistoricalVotes)?)
    } else {
        let feed: quorum_model::HistoricalVotesFeed = read_json(path, FeedKind::HistoricalVotes)?;
        Ok(feed.votes)
    }
}
