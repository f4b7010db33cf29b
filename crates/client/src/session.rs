//! Session identity carried by the surrounding application.
//!
//! The session is explicit context handed to the binding. The shell writes it
//! on login and logout; the synchronization layer only reads it.

use tokio::sync::watch;

/// The active user's name, or none when logged out.
#[derive(Debug, Clone)]
pub struct Session {
    user: watch::Sender<Option<String>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Session {
    pub fn new(user: Option<String>) -> Self {
        let (user, _) = watch::channel(user.filter(|name| !name.trim().is_empty()));
        Self { user }
    }

    /// Starts a session for `name`. Blank names log out.
    pub fn login(&self, name: impl Into<String>) {
        let name = name.into();
        let user = Some(name.trim().to_string()).filter(|name| !name.is_empty());
        tracing::info!(user = ?user, "Session login");
        self.user.send_replace(user);
    }

    pub fn logout(&self) {
        tracing::info!("Session logout");
        self.user.send_replace(None);
    }

    pub fn current(&self) -> Option<String> {
        self.user.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.user.subscribe()
    }
}
