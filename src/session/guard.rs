//! Debounced sign-out on authorization failures.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::SessionConfig;
use crate::session::handler::{SessionHandler, SignOutEvent};

/// Triggers at most one sign-out per cooldown window.
pub struct SessionGuard {
    cooldown: Duration,
    event: SignOutEvent,
    handler: Arc<dyn SessionHandler>,
    last_sign_out: Mutex<Option<Instant>>,
}

impl SessionGuard {
    pub fn new(config: &SessionConfig, handler: Arc<dyn SessionHandler>) -> Self {
        Self {
            cooldown: config.cooldown(),
            event: SignOutEvent {
                storage_key: config.storage_key.clone(),
                sign_in_path: config.sign_in_path.clone(),
            },
            handler,
            last_sign_out: Mutex::new(None),
        }
    }

    /// Inspect a terminal status; signs out on 401 when the cooldown allows.
    ///
    /// Returns true if the sign-out fired.
    pub fn observe(&self, status: u16) -> bool {
        if status != 401 {
            return false;
        }

        {
            // Check and stamp under one lock so a burst cannot double-fire.
            let mut last = self
                .last_sign_out
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let now = Instant::now();
            if let Some(previous) = *last {
                if now.duration_since(previous) < self.cooldown {
                    tracing::debug!("Session expired; sign-out already triggered within cooldown");
                    return false;
                }
            }
            *last = Some(now);
        }

        tracing::info!(sign_in_path = %self.event.sign_in_path, "Session expired, signing out");
        self.handler.sign_out(&self.event);
        true
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("cooldown", &self.cooldown)
            .field("sign_in_path", &self.event.sign_in_path)
            .finish()
    }
}
