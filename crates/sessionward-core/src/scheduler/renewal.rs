//! Timer-driven token renewal.
//!
//! One spawned task watches the session state. Whenever the pair
//! `(is_authenticated, token_expires_at)` changes it drops the armed timer and
//! arms a new one for `expires_at - margin`, or refreshes immediately when
//! that moment has already passed. The timer is an owned `Sleep`, so dropping
//! it (re-arm, sign-out, shutdown) is the cancellation.

use std::future::pending;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Sleep};
use tracing::{debug, info, warn};

use crate::auth::{SessionManager, SessionState};
use crate::utils::{minutes_to_millis, now_millis};

/// Minutes before expiry at which renewal is attempted
pub const DEFAULT_REFRESH_MARGIN_MINUTES: i64 = 4;

/// The only part of the state the scheduler reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RenewalKey {
    is_authenticated: bool,
    token_expires_at: Option<i64>,
}

impl RenewalKey {
    fn of(state: &SessionState) -> Self {
        Self {
            is_authenticated: state.is_authenticated,
            token_expires_at: state.token_expires_at(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Plan {
    Idle,
    Immediate,
    After(Duration),
}

fn plan(key: RenewalKey, margin_ms: i64, now: i64) -> Plan {
    let expires_at = match key {
        RenewalKey {
            is_authenticated: true,
            token_expires_at: Some(expires_at),
        } => expires_at,
        _ => return Plan::Idle,
    };

    let refresh_at = expires_at.saturating_sub(margin_ms);
    if now >= refresh_at {
        Plan::Immediate
    } else {
        Plan::After(Duration::from_millis(refresh_at.saturating_sub(now) as u64))
    }
}

/// Handle to the renewal task.
///
/// Dropping the handle aborts the task and with it any armed timer. A refresh
/// that already started keeps running; the manager discards its result if it
/// has been disposed by then.
pub struct RenewalScheduler {
    task: Option<JoinHandle<()>>,
}

impl RenewalScheduler {
    /// Start watching `manager`'s session
    pub fn spawn(manager: Arc<SessionManager>, margin_minutes: i64) -> Self {
        let rx = manager.subscribe();
        let margin_ms = minutes_to_millis(margin_minutes);
        debug!(margin_minutes, "Renewal scheduler starting");
        Self {
            task: Some(tokio::spawn(run(manager, rx, margin_ms))),
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the task and wait until its timer has been dropped
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        debug!("Renewal scheduler stopped");
    }
}

impl Drop for RenewalScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run(
    manager: Arc<SessionManager>,
    mut rx: watch::Receiver<SessionState>,
    margin_ms: i64,
) {
    let mut timer: Option<Pin<Box<Sleep>>> = None;
    let mut armed_for: Option<RenewalKey> = None;

    loop {
        let key = RenewalKey::of(&rx.borrow_and_update());

        if armed_for != Some(key) {
            armed_for = Some(key);
            timer = None;

            match plan(key, margin_ms, now_millis()) {
                Plan::Idle => debug!("No token expiry to track"),
                Plan::Immediate => {
                    info!("Token needs immediate refresh");
                    fire(&manager);
                }
                Plan::After(delay) => {
                    info!(delay_secs = delay.as_secs(), "Token refresh scheduled");
                    timer = Some(Box::pin(sleep(delay)));
                }
            }
        }

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    debug!("Session state closed, renewal stopping");
                    return;
                }
            }
            () = elapsed(&mut timer) => {
                timer = None;
                info!("Auto-refreshing token");
                fire(&manager);
            }
        }
    }
}

/// Resolves when the armed timer fires; never resolves when nothing is armed
async fn elapsed(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => pending().await,
    }
}

fn fire(manager: &Arc<SessionManager>) {
    let manager = Arc::clone(manager);
    tokio::spawn(async move {
        match manager.refresh_token().await {
            Ok(()) => info!("Token refreshed successfully"),
            Err(e) => warn!(error = %e, "Token refresh failed"),
        }
    });
}
