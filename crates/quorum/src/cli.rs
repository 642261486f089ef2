use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "quorum")]
#[command(version)]
#[command(about = "Governance lifecycle reconciliation for forum topics and on-chain votes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile feed snapshots into lifecycle groups
    Reconcile {
        /// Topics feed snapshot (JSON)
        #[arg(short, long)]
        topics: String,

        /// Active vote contracts (JSON or JSONL)
        #[arg(short, long)]
        active: Option<String>,

        /// Historical vote results (JSON or JSONL)
        #[arg(long)]
        history: Option<String>,

        /// Manual override feed (JSON)
        #[arg(long)]
        overrides: Option<String>,

        /// Emit the full read models as JSON instead of a summary
        #[arg(long)]
        json: bool,

        /// Also write the JSON read models to a file
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Classify a single subject line
    Classify {
        /// Subject text to classify
        subject: String,

        /// Forum flow tag: cip, featured-app, shared, other
        #[arg(short, long, default_value = "shared")]
        flow: String,

        /// Optional body text to extract identifiers from
        #[arg(short, long, default_value = "")]
        body: String,
    },

    /// Summarize classification and vote outcomes across the feeds
    Report {
        /// Topics feed snapshot (JSON)
        #[arg(short, long)]
        topics: String,

        /// Active vote contracts (JSON or JSONL)
        #[arg(short, long)]
        active: Option<String>,

        /// Historical vote results (JSON or JSONL)
        #[arg(long)]
        history: Option<String>,
    },

    /// Print version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_version() {
        let cli = Cli::try_parse_from(["quorum", "version"]);
        assert!(cli.is_ok());
        assert!(matches!(cli.unwrap().command, Commands::Version));
    }

    #[test]
    fn test_cli_parse_reconcile() {
        let cli = Cli::try_parse_from([
            "quorum",
            "reconcile",
            "--topics",
            "topics.json",
            "--active",
            "votes.jsonl",
            "--json",
        ]);
        assert!(cli.is_ok());
        if let Commands::Reconcile {
            topics,
            active,
            history,
            json,
            ..
        } = cli.unwrap().command
        {
            assert_eq!(topics, "topics.json");
            assert_eq!(active, Some("votes.jsonl".to_string()));
            assert_eq!(history, None);
            assert!(json);
        } else {
            panic!("Expected Reconcile command");
        }
    }

    #[test]
    fn test_cli_parse_classify_defaults() {
        let cli = Cli::try_parse_from(["quorum", "classify", "CIP-12: fees"]);
        assert!(cli.is_ok());
        if let Commands::Classify { subject, flow, body } = cli.unwrap().command {
            assert_eq!(subject, "CIP-12: fees");
            assert_eq!(flow, "shared");
            assert!(body.is_empty());
        } else {
            panic!("Expected Classify command");
        }
    }
}
