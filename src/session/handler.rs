//! Sign-out side effects supplied by the host application.

/// What the host must do when the session has expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOutEvent {
    /// Storage key of the persisted session token to clear.
    pub storage_key: String,
    /// Sign-in entry point to navigate to.
    pub sign_in_path: String,
}

/// Performs the sign-out: clear persisted session state and navigate to
/// the sign-in entry point.
pub trait SessionHandler: Send + Sync + 'static {
    fn sign_out(&self, event: &SignOutEvent);
}

impl<F> SessionHandler for F
where
    F: Fn(&SignOutEvent) + Send + Sync + 'static,
{
    fn sign_out(&self, event: &SignOutEvent) {
        self(event)
    }
}

/// Default handler: records the sign-out and leaves navigation to the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSessionHandler;

impl SessionHandler for LoggingSessionHandler {
    fn sign_out(&self, event: &SignOutEvent) {
        tracing::warn!(
            storage_key = %event.storage_key,
            sign_in_path = %event.sign_in_path,
            "Session expired; no session handler installed"
        );
    }
}
