//! Command handlers for the sessionward CLI.
//!
//! `App` plays the part of the UI: it owns the single `SessionManager` for
//! the process, restores the persisted session on startup and calls the
//! collaborator API for each command.

use std::future::Future;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Result};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use sessionward_core::auth::{guard, Access, Credentials, RoleGate, SessionManager};
use sessionward_core::models::{display_name, user_initials, UserUpdate};
use sessionward_core::scheduler::{RenewalInfo, RenewalScheduler};
use sessionward_core::utils::{format_minutes, format_timestamp, mask_token, now_millis};
use sessionward_core::verifier::demo_accounts;
use sessionward_core::{AuthError, Config, SessionState};

use crate::cli::Command;

pub struct App {
    config: Config,
    config_path: Option<PathBuf>,
    manager: Arc<SessionManager>,
}

impl App {
    /// Build the manager from config and restore any persisted session
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Result<Self> {
        let store = config.session_store()?;
        let verifier = config.verifier()?;
        let manager = SessionManager::new(store, verifier)
            .with_default_lifetime(config.default_lifetime_minutes);
        manager.initialize();
        debug!(
            authenticated = manager.state().is_authenticated,
            storage = ?config.storage,
            "Session restored"
        );

        Ok(Self {
            config,
            config_path,
            manager: Arc::new(manager),
        })
    }

    pub async fn run(&mut self, command: Command) -> Result<ExitCode> {
        let result = match command {
            Command::Login { email, password } => self.login(email, password).await,
            Command::Logout => self.logout(),
            Command::Status => self.status(),
            Command::Whoami => self.whoami(),
            Command::CheckRole { roles } => self.check_role(roles),
            Command::Update { name, department } => self.update(name, department),
            Command::Refresh => self.refresh().await,
            Command::DemoUsers => self.demo_users(),
            Command::Watch => self.watch().await,
        };
        self.manager.dispose();
        result
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    async fn login(&mut self, email: Option<String>, password: Option<String>) -> Result<ExitCode> {
        let email = match email {
            Some(email) => email,
            None => self.prompt_email()?,
        };
        let password = match password {
            Some(password) => password,
            None => rpassword::prompt_password("Password: ")?,
        };

        let credentials = Credentials::new(email, password);
        if !credentials.is_complete() {
            bail!("Email and password required");
        }

        println!("Authenticating...");
        if let Err(e) = self.manager.sign_in(&credentials).await {
            self.manager.clear_error();
            bail!(e);
        }

        self.config.last_email = Some(credentials.email.clone());
        if let Err(e) = self.save_config() {
            warn!(error = %e, "Failed to save config");
        }

        let state = self.manager.state();
        info!("Login successful");
        println!(
            "Signed in as {} [{}]",
            display_name(state.user.as_ref()),
            user_initials(state.user.as_ref())
        );
        Ok(ExitCode::SUCCESS)
    }

    fn prompt_email(&self) -> Result<String> {
        match self.config.last_email {
            Some(ref last) => print!("Email [{}]: ", last),
            None => print!("Email: "),
        }
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        Ok(match (input.is_empty(), &self.config.last_email) {
            (true, Some(last)) => last.clone(),
            _ => input.to_string(),
        })
    }

    fn logout(&self) -> Result<ExitCode> {
        self.manager.sign_out();
        println!("Signed out");
        Ok(ExitCode::SUCCESS)
    }

    async fn refresh(&self) -> Result<ExitCode> {
        match self.manager.refresh_token().await {
            Ok(()) => {
                println!("Token refreshed");
                self.print_renewal(&self.manager.state());
                Ok(ExitCode::SUCCESS)
            }
            Err(AuthError::NotAuthenticated) => bail!("Not signed in"),
            Err(e) => bail!("{}. You have been signed out.", e),
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Authenticated with a pair that has not expired yet
    fn is_signed_in(&self) -> bool {
        self.manager.state().is_session_valid(now_millis())
    }

    fn status(&self) -> Result<ExitCode> {
        let state = self.manager.state();
        let (Some(user), Some(tokens)) = (state.user.as_ref(), state.tokens.as_ref()) else {
            println!("Not signed in");
            return Ok(ExitCode::from(1));
        };
        let valid = state.is_session_valid(now_millis());

        println!("User:        {} <{}>", user.display_name(), user.email);
        println!("Roles:       {}", user.roles.join(", "));
        if let Some(ref department) = user.department {
            println!("Department:  {}", department);
        }
        println!("Access:      {}", mask_token(&tokens.access_token));
        println!("Token type:  {}", tokens.token_type);
        self.print_renewal(&state);
        Ok(if valid { ExitCode::SUCCESS } else { ExitCode::from(1) })
    }

    fn print_renewal(&self, state: &SessionState) {
        let Some(info) = RenewalInfo::compute(state, self.config.refresh_margin_minutes, now_millis())
        else {
            return;
        };
        println!(
            "Expires:     {} ({})",
            format_timestamp(info.expires_at),
            format_minutes(info.minutes_until_expiry.max(0))
        );
        println!(
            "Refresh at:  {} ({})",
            format_timestamp(info.refresh_at),
            format_minutes(info.minutes_until_refresh)
        );
        println!("Status:      {}", info.status.label());
    }

    fn whoami(&self) -> Result<ExitCode> {
        let state = self.manager.state();
        if !state.is_session_valid(now_millis()) {
            println!("{}", display_name(None));
            return Ok(ExitCode::from(1));
        }
        println!("{}", display_name(state.user.as_ref()));
        Ok(ExitCode::SUCCESS)
    }

    fn check_role(&self, roles: Vec<String>) -> Result<ExitCode> {
        let state = self.manager.state();
        match guard(&state, &RoleGate::any_of(roles)) {
            Access::Granted => {
                println!("granted");
                Ok(ExitCode::SUCCESS)
            }
            Access::Forbidden => {
                println!("You don't have permission to access this page.");
                Ok(ExitCode::from(1))
            }
            Access::Unauthenticated | Access::Loading => {
                println!("Please sign in to access this page.");
                Ok(ExitCode::from(2))
            }
        }
    }

    fn update(&self, name: Option<String>, department: Option<String>) -> Result<ExitCode> {
        if !self.is_signed_in() {
            bail!("Not signed in");
        }
        self.manager.update_user(UserUpdate {
            name,
            department,
            ..Default::default()
        });
        println!("Profile updated");
        Ok(ExitCode::SUCCESS)
    }

    fn demo_users(&self) -> Result<ExitCode> {
        if let Some(ref url) = self.config.api_base_url {
            println!("Credentials are verified by {}", url);
            return Ok(ExitCode::SUCCESS);
        }
        for account in demo_accounts() {
            println!(
                "{:<20} {:<10} {:<18} {}",
                account.email,
                account.password,
                account.roles.join(","),
                account.department.as_deref().unwrap_or("-")
            );
        }
        Ok(ExitCode::SUCCESS)
    }

    // =========================================================================
    // Renewal
    // =========================================================================

    async fn watch(&self) -> Result<ExitCode> {
        if !self.is_signed_in() {
            bail!("Not signed in");
        }

        let scheduler =
            RenewalScheduler::spawn(self.manager.clone(), self.config.refresh_margin_minutes);
        let rx = self.manager.subscribe();
        self.print_renewal(&self.manager.state());
        println!("Watching session, Ctrl+C to stop");

        let exit = self
            .follow(rx, async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await;

        scheduler.shutdown().await;
        Ok(exit)
    }

    /// Report session transitions until `stop` resolves or the session ends
    async fn follow<F>(&self, mut rx: watch::Receiver<SessionState>, stop: F) -> ExitCode
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(stop);

        loop {
            tokio::select! {
                _ = &mut stop => return ExitCode::SUCCESS,
                changed = rx.changed() => {
                    if changed.is_err() {
                        return ExitCode::SUCCESS;
                    }
                    let state = rx.borrow_and_update().clone();
                    if state.is_loading {
                        continue;
                    }
                    if !state.is_session_valid(now_millis()) {
                        println!("Session ended");
                        return ExitCode::from(1);
                    }
                    println!("Session renewed");
                    self.print_renewal(&state);
                }
            }
        }
    }

    fn save_config(&self) -> Result<()> {
        match self.config_path {
            Some(ref path) => self.config.save_to(path),
            None => self.config.save(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use sessionward_core::store::{MemoryBackend, SessionStore, DEFAULT_NAMESPACE};
    use sessionward_core::verifier::MockVerifier;
    use sessionward_core::StorageKind;

    fn memory_config() -> Config {
        Config {
            storage: StorageKind::Memory,
            login_latency_ms: 0,
            refresh_latency_ms: 0,
            ..Config::default()
        }
    }

    async fn signed_in_app(dir: &tempfile::TempDir, email: &str, password: &str) -> App {
        let path = dir.path().join("config.json");
        let mut app = App::new(memory_config(), Some(path)).unwrap();
        let code = app
            .login(Some(email.to_string()), Some(password.to_string()))
            .await
            .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        app
    }

    #[tokio::test]
    async fn test_login_remembers_email() {
        let dir = tempfile::tempdir().unwrap();
        let app = signed_in_app(&dir, "jane@example.com", "jane123").await;
        assert!(app.manager.state().is_authenticated);

        let saved = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(saved.last_email.as_deref(), Some("jane@example.com"));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_password() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(memory_config(), Some(dir.path().join("config.json"))).unwrap();
        let err = app
            .login(Some("jane@example.com".into()), Some("wrong".into()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid password. Please try again.");
        assert!(app.manager.state().error.is_none());
        assert!(!dir.path().join("config.json").exists());
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let mut app = App::new(memory_config(), None).unwrap();
        assert!(app
            .login(Some("jane@example.com".into()), Some(String::new()))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_check_role_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let signed_out = App::new(memory_config(), None).unwrap();
        assert_eq!(
            signed_out.check_role(vec!["user".into()]).unwrap(),
            ExitCode::from(2)
        );

        let app = signed_in_app(&dir, "jane@example.com", "jane123").await;
        assert_eq!(
            app.check_role(vec!["admin".into(), "manager".into()]).unwrap(),
            ExitCode::SUCCESS
        );
        assert_eq!(app.check_role(vec!["admin".into()]).unwrap(), ExitCode::from(1));
    }

    #[tokio::test]
    async fn test_update_and_logout() {
        let dir = tempfile::tempdir().unwrap();
        let app = signed_in_app(&dir, "john@example.com", "john123").await;

        app.update(Some("Johnny".into()), None).unwrap();
        let user = app.manager.state().user.unwrap();
        assert_eq!(user.name, "Johnny");
        assert_eq!(user.email, "john@example.com");

        app.logout().unwrap();
        assert!(!app.manager.state().is_authenticated);
        assert!(app.update(Some("Again".into()), None).is_err());
    }

    #[tokio::test]
    async fn test_follow_stops_on_signal() {
        let dir = tempfile::tempdir().unwrap();
        let app = signed_in_app(&dir, "jane@example.com", "jane123").await;
        let rx = app.manager.subscribe();
        assert_eq!(app.follow(rx, async {}).await, ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn test_follow_ends_with_session() {
        let dir = tempfile::tempdir().unwrap();
        let app = signed_in_app(&dir, "jane@example.com", "jane123").await;
        let rx = app.manager.subscribe();
        app.manager.sign_out();
        assert_eq!(
            app.follow(rx, std::future::pending()).await,
            ExitCode::from(1)
        );
    }

    #[tokio::test]
    async fn test_follow_reports_renewal_then_stops() {
        let dir = tempfile::tempdir().unwrap();
        let app = signed_in_app(&dir, "jane@example.com", "jane123").await;
        let rx = app.manager.subscribe();
        app.manager.refresh_token().await.unwrap();

        // The renewal is seen first; the stop signal ends the loop afterwards
        let stop = async {
            tokio::task::yield_now().await;
        };
        assert_eq!(app.follow(rx, stop).await, ExitCode::SUCCESS);
        assert!(app.is_signed_in());
    }

    #[tokio::test]
    async fn test_expired_session_is_signed_out_for_commands() {
        let dir = tempfile::tempdir().unwrap();
        let verifier = MockVerifier::new()
            .with_latency(Duration::ZERO, Duration::ZERO)
            .with_lifetime(-1);
        let store = SessionStore::new(Arc::new(MemoryBackend::new()), DEFAULT_NAMESPACE);
        let mut app = App {
            config: memory_config(),
            config_path: Some(dir.path().join("config.json")),
            manager: Arc::new(SessionManager::new(store, Arc::new(verifier))),
        };
        app.login(Some("admin@example.com".into()), Some("admin123".into()))
            .await
            .unwrap();
        assert!(app.manager.state().is_authenticated);

        assert!(!app.is_signed_in());
        assert_eq!(app.whoami().unwrap(), ExitCode::from(1));
        assert_eq!(app.status().unwrap(), ExitCode::from(1));
        assert_eq!(
            app.check_role(vec!["admin".into()]).unwrap(),
            ExitCode::from(2)
        );
        assert!(app.update(Some("Late".into()), None).is_err());
    }

    #[tokio::test]
    async fn test_refresh_requires_session() {
        let app = App::new(memory_config(), None).unwrap();
        let err = app.refresh().await.unwrap_err();
        assert_eq!(err.to_string(), "Not signed in");
    }
}
