//! Shell state shared by every command handler, plus CLI error types.

use std::{io, sync::Arc};

use dialoguer::theme::ColorfulTheme;
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use thiserror::Error;
use tracing::debug;

use crate::{
    auth::{AuthError, Authenticator, LocalAuthenticator, Session},
    cli::{commands::REGISTRY, io as cli_io, output},
    config::{Config, ConfigError, ConfigManager},
    core::{BudgetLedger, Clock, PeriodManager, SystemClock},
    domain::{FolderId, NamedEntity, UserRecord},
    errors::BudgetError,
    store::{JsonDocumentStore, RemoteStore, StoreError},
    utils::paths::PathResolver,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Not signed in. Use `login` or `register` first.")]
    NotSignedIn,
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Budget(#[from] BudgetError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl CommandError {
    pub(crate) fn usage(usage: &str) -> Self {
        CommandError::InvalidArguments(format!("usage: {}", usage))
    }
}

/// Failures that end the shell rather than a single command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Display name and email of the signed-in user, as last fetched.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Profile {
    pub name: String,
    pub email: String,
}

impl From<&UserRecord> for Profile {
    fn from(record: &UserRecord) -> Self {
        Self {
            name: record.display_name().to_string(),
            email: record.email.clone(),
        }
    }
}

pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) running: bool,
    pub(crate) config: Config,
    pub(crate) store: Arc<dyn RemoteStore>,
    pub(crate) auth: Arc<dyn Authenticator>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) session: Option<Session>,
    pub(crate) profile: Option<Profile>,
    pub(crate) ledger: BudgetLedger,
    pub(crate) periods: PeriodManager,
    pub(crate) theme: ColorfulTheme,
}

impl ShellContext {
    /// Opens the file-backed stores under `$BUDGET_FOLDERS_HOME` (or `~/.budget_folders`).
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let base = PathResolver::base_dir();
        let config = ConfigManager::with_base_dir(&base)?.load()?;
        let data_dir = config.resolve_data_dir(&base);
        let store = JsonDocumentStore::new(PathResolver::users_dir_in(&data_dir))?;
        let auth = LocalAuthenticator::open(
            PathResolver::credentials_file_in(&data_dir),
            config.password_cost,
        )?;
        debug!(data_dir = %data_dir.display(), "shell stores opened");
        Ok(Self::with_parts(
            mode,
            config,
            Arc::new(store),
            Arc::new(auth),
            Arc::new(SystemClock),
        ))
    }

    pub fn with_parts(
        mode: CliMode,
        config: Config,
        store: Arc<dyn RemoteStore>,
        auth: Arc<dyn Authenticator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            mode,
            running: true,
            config,
            ledger: BudgetLedger::new(store.clone(), clock.clone()),
            periods: PeriodManager::new(store.clone()),
            store,
            auth,
            clock,
            session: None,
            profile: None,
            theme: ColorfulTheme::default(),
        }
    }

    pub fn mode(&self) -> CliMode {
        self.mode
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn prompt(&self) -> String {
        match &self.profile {
            Some(profile) => format!("budget({})> ", profile.name),
            None => "budget> ".to_string(),
        }
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        REGISTRY.names().collect()
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = REGISTRY.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = REGISTRY
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::hint(format!("Did you mean `{}`?", name));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(cli_io::confirm_action(&self.theme, "Exit shell?", true)?)
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            CommandError::NotSignedIn => {
                output::error(CommandError::NotSignedIn);
                output::hint("Try `register <name> <email>` to create an account.");
            }
            CommandError::Budget(err @ BudgetError::Persistence { .. }) => {
                output::error(&err);
                if self.ledger.is_dirty() {
                    output::hint("Changes are kept locally. Run `sync` to retry saving them.");
                }
            }
            other => output::error(other),
        }
    }

    /// Active session, cloned so ledger calls can borrow `self` mutably.
    pub(crate) fn require_session(&self) -> Result<Session, CommandError> {
        let session = self.session.as_ref().ok_or(CommandError::NotSignedIn)?;
        if !self.auth.is_active(session) {
            return Err(AuthError::SessionExpired.into());
        }
        Ok(session.clone())
    }

    /// Fetches the signed-in user's document once and seeds the ledger and
    /// period manager from it.
    pub(crate) fn sign_in(&mut self, session: Session) -> Result<UserRecord, CommandError> {
        let record = self
            .store
            .fetch(&session.user_id)
            .map_err(|err| BudgetError::from_store("load profile", err))?;
        self.ledger = BudgetLedger::new(self.store.clone(), self.clock.clone());
        self.periods = PeriodManager::new(self.store.clone());
        self.ledger.load_from(&session, &record);
        self.periods.load_from(&session, &record);
        self.profile = Some(Profile::from(&record));
        self.session = Some(session);
        Ok(record)
    }

    pub(crate) fn sign_out(&mut self) -> Result<bool, CommandError> {
        let Some(session) = self.session.take() else {
            return Ok(false);
        };
        self.auth.sign_out(&session)?;
        self.profile = None;
        self.ledger = BudgetLedger::new(self.store.clone(), self.clock.clone());
        self.periods = PeriodManager::new(self.store.clone());
        Ok(true)
    }

    /// Resolves a folder by id, then by unique case-insensitive name. Unknown
    /// input is returned as an id so the ledger reports it.
    pub(crate) fn resolve_folder(&self, raw: &str) -> Result<FolderId, CommandError> {
        let id = FolderId::new(raw);
        if self.ledger.folder(&id).is_some() {
            return Ok(id);
        }
        let matches: Vec<&FolderId> = self
            .ledger
            .folders()
            .iter()
            .filter(|folder| folder.name().eq_ignore_ascii_case(raw.trim()))
            .map(|folder| &folder.id)
            .collect();
        match matches.as_slice() {
            [single] => Ok((*single).clone()),
            [] => Ok(id),
            _ => Err(CommandError::InvalidArguments(format!(
                "`{}` matches several folders; use the folder id instead",
                raw
            ))),
        }
    }

    pub(crate) fn format_amount(&self, amount: f64) -> String {
        self.config.format_amount(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::ManualClock, store::MemoryStore};
    use chrono::{TimeZone, Utc};

    fn context_with(store: Arc<MemoryStore>) -> ShellContext {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap());
        ShellContext::with_parts(
            CliMode::Script,
            Config::default(),
            store,
            Arc::new(LocalAuthenticator::in_memory(4)),
            Arc::new(clock),
        )
    }

    fn run(context: &mut ShellContext, line: &[&str]) -> Result<LoopControl, CommandError> {
        let (command, args) = line.split_first().unwrap();
        context.dispatch(command, command, args)
    }

    #[test]
    fn folder_commands_require_a_session() {
        let mut context = context_with(Arc::new(MemoryStore::new()));
        let err = run(&mut context, &["add-folder", "Food", "100"]).unwrap_err();
        assert!(matches!(err, CommandError::NotSignedIn));
    }

    #[test]
    fn register_setup_and_spend_flow() {
        let store = Arc::new(MemoryStore::new());
        let mut context = context_with(store.clone());
        run(&mut context, &["register", "Ada", "ada@example.com", "pw"]).unwrap();
        run(&mut context, &["setup", "1000", "2025-01-01", "2025-01-31"]).unwrap();
        run(&mut context, &["add-folder", "Groceries", "200"]).unwrap();
        run(&mut context, &["spend", "groceries", "45"]).unwrap();

        let session = context.session.clone().unwrap();
        let stored = store.document(&session.user_id).unwrap();
        assert_eq!(stored.folders[0].spent_so_far, 45.0);
        assert_eq!(context.ledger.compute_remaining_budget(1000.0), 955.0);
    }

    #[test]
    fn ambiguous_names_are_rejected() {
        let mut context = context_with(Arc::new(MemoryStore::new()));
        run(&mut context, &["register", "Ada", "ada@example.com", "pw"]).unwrap();
        run(&mut context, &["add-folder", "Food", "10"]).unwrap();
        run(&mut context, &["add-folder", "food", "20"]).unwrap();
        assert!(matches!(
            context.resolve_folder("FOOD"),
            Err(CommandError::InvalidArguments(_))
        ));
    }

    #[test]
    fn login_reads_the_document_once() {
        let store = Arc::new(MemoryStore::new());
        let mut context = context_with(store.clone());
        run(&mut context, &["register", "Ada", "ada@example.com", "pw"]).unwrap();
        run(&mut context, &["add-folder", "Rent", "600"]).unwrap();
        run(&mut context, &["logout"]).unwrap();

        let before = store.read_count();
        run(&mut context, &["login", "ada@example.com", "pw"]).unwrap();
        assert_eq!(store.read_count() - before, 1);
        assert_eq!(context.ledger.folders().len(), 1);
    }

    #[test]
    fn exit_stops_the_loop() {
        let mut context = context_with(Arc::new(MemoryStore::new()));
        assert_eq!(run(&mut context, &["quit"]).unwrap(), LoopControl::Exit);
    }

    #[test]
    fn logout_clears_local_state() {
        let mut context = context_with(Arc::new(MemoryStore::new()));
        run(&mut context, &["register", "Ada", "ada@example.com", "pw"]).unwrap();
        run(&mut context, &["add-folder", "Food", "10"]).unwrap();
        run(&mut context, &["logout"]).unwrap();
        assert!(context.session.is_none());
        assert!(context.ledger.folders().is_empty());
    }
}
