mod cli;
mod config;
mod dispatch;
mod error;
mod prompt;
mod secrets;
mod transport;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::config::{CONFIG_FILE_NAME, Config, DispatchConfig, DispatchOverrides};
use crate::dispatch::{Credential, DispatchRequest, DispatchTrigger};
use crate::prompt::{Interaction, NoticeKind, Terminal};
use crate::secrets::{SecretProvider, SecretStore};
use crate::transport::{HttpTransport, Transport};

const SUCCESS_MESSAGE: &str = "Update triggered! Check GitHub Actions tab for progress.";

#[derive(Debug, PartialEq, Eq)]
enum TriggerOutcome {
    Cancelled,
    Triggered,
    Failed,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "✗".red(), e);
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn default_config_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_FILE_NAME))
        .context("Unable to determine home directory")
}

fn run(cli: Cli) -> Result<i32> {
    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };

    match cli.commands {
        Commands::Init { force } => {
            Config::init(config_path, force)?;
        }
        Commands::Show => {
            let config = Config::create_or_load(config_path)?;
            let store = SecretStore::from_source(&config.settings.secret_source);
            let present =
                Credential::from_secret(store.get_secret(&config.settings.secret_name)).is_some();
            config.show(present);
        }
        Commands::Trigger {
            yes,
            owner,
            repo,
            event_type,
        } => {
            let config = Config::create_or_load(config_path)?;
            let request = config.dispatch_request(&DispatchOverrides {
                owner,
                repo,
                event_type,
            });
            let transport =
                HttpTransport::new(config.timeout()).context("Failed to build HTTP client")?;
            let trigger = DispatchTrigger::new(
                SecretStore::from_source(&config.settings.secret_source),
                transport,
            )
            .with_secret_name(config.settings.secret_name.as_str());

            let outcome = trigger_update(&Terminal, &trigger, &request, &config.settings, yes)
                .context("Unable to read confirmation")?;
            if outcome == TriggerOutcome::Failed {
                return Ok(1);
            }
        }
    }
    Ok(0)
}

/// Confirm, dispatch once, then report. The dispatch never happens without a yes.
fn trigger_update<S: SecretProvider, T: Transport>(
    ui: &impl Interaction,
    trigger: &DispatchTrigger<S, T>,
    request: &DispatchRequest,
    settings: &DispatchConfig,
    skip_confirm: bool,
) -> io::Result<TriggerOutcome> {
    if !skip_confirm && !ui.confirm(&settings.confirm_title, &settings.confirm_message)? {
        println!("{}", "Cancelled, nothing was sent".yellow());
        return Ok(TriggerOutcome::Cancelled);
    }

    let result = trigger.run(request);
    if result.succeeded {
        info!(status = ?result.status_code, "{}", result.message);
        ui.notify(NoticeKind::Success, "Success", SUCCESS_MESSAGE);
        Ok(TriggerOutcome::Triggered)
    } else {
        ui.notify(
            NoticeKind::Error,
            "Error",
            &format!("Failed to trigger update: {}", result.message),
        );
        Ok(TriggerOutcome::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{OutboundRequest, TransportError, TransportResponse};
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    struct ScriptedUi {
        answer: bool,
        asked: Cell<usize>,
        notices: RefCell<Vec<(NoticeKind, String, String)>>,
    }

    impl ScriptedUi {
        fn answering(answer: bool) -> Self {
            Self {
                answer,
                asked: Cell::new(0),
                notices: RefCell::new(Vec::new()),
            }
        }
    }

    impl Interaction for ScriptedUi {
        fn confirm(&self, _title: &str, _message: &str) -> io::Result<bool> {
            self.asked.set(self.asked.get() + 1);
            Ok(self.answer)
        }

        fn notify(&self, kind: NoticeKind, title: &str, message: &str) {
            self.notices
                .borrow_mut()
                .push((kind, title.to_string(), message.to_string()));
        }
    }

    struct CountingTransport {
        status: u16,
        body: &'static str,
        sent: Cell<usize>,
    }

    impl CountingTransport {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                sent: Cell::new(0),
            }
        }
    }

    impl Transport for CountingTransport {
        fn send(&self, _request: &OutboundRequest) -> Result<TransportResponse, TransportError> {
            self.sent.set(self.sent.get() + 1);
            Ok(TransportResponse {
                status: self.status,
                body: self.body.to_string(),
            })
        }
    }

    fn token() -> HashMap<String, String> {
        HashMap::from([("GH_PAT".to_string(), "ghp_token".to_string())])
    }

    fn request() -> DispatchRequest {
        DispatchRequest::new("Nalhan", "BotaTools", "update-lines")
    }

    #[test]
    fn declining_sends_nothing() {
        let secrets = token();
        let transport = CountingTransport::new(204, "");
        let trigger = DispatchTrigger::new(&secrets, &transport);
        let ui = ScriptedUi::answering(false);

        let outcome =
            trigger_update(&ui, &trigger, &request(), &DispatchConfig::default(), false).unwrap();

        assert_eq!(outcome, TriggerOutcome::Cancelled);
        assert_eq!(ui.asked.get(), 1);
        assert_eq!(transport.sent.get(), 0);
        assert!(ui.notices.borrow().is_empty());
    }

    #[test]
    fn confirmed_success_notifies_once() {
        let secrets = token();
        let transport = CountingTransport::new(204, "");
        let trigger = DispatchTrigger::new(&secrets, &transport);
        let ui = ScriptedUi::answering(true);

        let outcome =
            trigger_update(&ui, &trigger, &request(), &DispatchConfig::default(), false).unwrap();

        assert_eq!(outcome, TriggerOutcome::Triggered);
        assert_eq!(transport.sent.get(), 1);
        let notices = ui.notices.borrow();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].0, NoticeKind::Success);
        assert_eq!(notices[0].2, SUCCESS_MESSAGE);
    }

    #[test]
    fn failure_is_reported_verbatim() {
        let secrets = token();
        let transport = CountingTransport::new(403, "Bad credentials");
        let trigger = DispatchTrigger::new(&secrets, &transport);
        let ui = ScriptedUi::answering(true);

        let outcome =
            trigger_update(&ui, &trigger, &request(), &DispatchConfig::default(), false).unwrap();

        assert_eq!(outcome, TriggerOutcome::Failed);
        let notices = ui.notices.borrow();
        assert_eq!(notices[0].0, NoticeKind::Error);
        assert_eq!(
            notices[0].2,
            "Failed to trigger update: GitHub API returned: 403 Bad credentials"
        );
    }

    #[test]
    fn skip_confirm_does_not_prompt() {
        let secrets: HashMap<String, String> = HashMap::new();
        let transport = CountingTransport::new(204, "");
        let trigger = DispatchTrigger::new(&secrets, &transport);
        let ui = ScriptedUi::answering(false);

        let outcome =
            trigger_update(&ui, &trigger, &request(), &DispatchConfig::default(), true).unwrap();

        assert_eq!(outcome, TriggerOutcome::Failed);
        assert_eq!(ui.asked.get(), 0);
        assert_eq!(transport.sent.get(), 0);
        assert!(ui.notices.borrow()[0].2.contains("GH_PAT"));
    }
}
