use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "quipu")]
#[command(about = "Small-business survey: validate, autosave and submit answers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to settings.json in the user data dir)
    #[arg(long, global = true, env = "QUIPU_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Submission endpoint, overrides the settings file
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Transport to use: post or get
    #[arg(long, global = true)]
    pub transport: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the submission endpoint answers
    Probe,
    /// Run a full survey from a JSON file of step forms and submit it
    Submit {
        /// JSON object with step1..step6 forms
        answers: PathBuf,

        /// Extra attempts after a failed submission
        #[arg(long, default_value = "0")]
        retries: u32,
    },
    /// Print the sheet header and the row a submission would append (TSV)
    Row {
        /// JSON object with step1..step6 forms
        answers: PathBuf,
    },
    /// Inspect or discard the autosaved survey
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotAction {
    Show,
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_submit_with_global_flags() {
        let cli = Cli::try_parse_from([
            "quipu",
            "submit",
            "answers.json",
            "--retries",
            "2",
            "--transport",
            "get",
        ])
        .expect("parse");
        assert_eq!(cli.transport.as_deref(), Some("get"));
        match cli.command {
            Commands::Submit { answers, retries } => {
                assert_eq!(answers, PathBuf::from("answers.json"));
                assert_eq!(retries, 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_snapshot_actions() {
        let cli = Cli::try_parse_from(["quipu", "snapshot", "clear"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Snapshot {
                action: SnapshotAction::Clear
            }
        ));
        assert!(Cli::try_parse_from(["quipu", "snapshot"]).is_err());
    }
}
