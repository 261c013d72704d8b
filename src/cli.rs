use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Trigger a GitHub repository-dispatch workflow after confirmation
#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    /// Config file to use instead of ~/repo_dispatch.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub commands: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask for confirmation, then send the repository dispatch
    Trigger {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        #[arg(long)]
        owner: Option<String>,

        #[arg(long)]
        repo: Option<String>,

        #[arg(short, long)]
        event_type: Option<String>,
    },

    /// Print the effective configuration
    Show,

    /// Write a default config file
    Init {
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn trigger_flags_parse() {
        let cli = Cli::parse_from([
            "repo-dispatch",
            "trigger",
            "--yes",
            "--repo",
            "Fork",
            "-e",
            "rebuild",
            "--config",
            "/tmp/c.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        match cli.commands {
            Commands::Trigger {
                yes,
                owner,
                repo,
                event_type,
            } => {
                assert!(yes);
                assert_eq!(owner, None);
                assert_eq!(repo.as_deref(), Some("Fork"));
                assert_eq!(event_type.as_deref(), Some("rebuild"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
