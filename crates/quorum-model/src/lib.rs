//! Data model and feed I/O for the governance reconciliation pipeline

mod feeds;
mod io;
mod types;

pub use feeds::{
    ActiveVotesFeed, CardOverride, FeedError, FeedKind, HistoricalVotesFeed, MergeOverride,
    OverrideFeed, SourceHealth, SourceHealthSet, TopicStats, TopicsFeed, TypeOverride,
};
pub use io::{atomic_write, read_json, read_jsonl, write_json};
pub use types::{
    EntityType, Flow, GroupedItem, InferredStage, LifecycleItem, Network, OnChainVoteItem, SvVote,
    Topic, TopicIdentifiers, VoteAction, VoteContract, VotePayload, VoteReason, VoteResult,
    VoteSource, VoteStage, VoteStatus,
};
