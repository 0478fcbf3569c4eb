//! Signed-in session state.
//!
//! A [`SessionState`] belongs to one signed-in client and is shared
//! (`Arc<SessionState>`) by the parts of that client that need to know who
//! is signed in. It is never shared between users; the HTTP server keeps
//! none and works from each caller's bearer token. Components that react to
//! sign-in changes register a listener with [`SessionState::subscribe`] and
//! release it with [`SessionState::unsubscribe`].
//!
//! A failed auth operation leaves the current session untouched.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::{info, warn};
use url::Url;

use crate::auth::{expiry_after, AuthError, AuthProvider, OAuthProvider, Session, SignUpOutcome};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn(Session),
    SignedOut,
}

/// Handle returned by [`SessionState::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

pub struct SessionState {
    provider: Arc<dyn AuthProvider>,
    current: Mutex<Option<Session>>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

impl SessionState {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            provider,
            current: Mutex::new(None),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Current session, if one exists and has not expired.
    ///
    /// The first read after expiry clears the session and notifies
    /// listeners with [`SessionEvent::SignedOut`].
    pub fn get_session(&self) -> Option<Session> {
        {
            let mut current = lock(&self.current);
            if !current.as_ref().is_some_and(|s| s.is_expired(Utc::now())) {
                return current.clone();
            }
            *current = None;
        }
        info!("session expired");
        self.notify(&SessionEvent::SignedOut);
        None
    }

    pub fn is_signed_in(&self) -> bool {
        self.get_session().is_some()
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let outcome = self.provider.sign_up(email, password).await.map_err(|e| {
            warn!(error = %e, "sign-up failed");
            e
        })?;
        if let SignUpOutcome::SignedIn(session) = &outcome {
            self.set_session(session.clone());
        }
        Ok(outcome)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = self.provider.sign_in(email, password).await.map_err(|e| {
            warn!(error = %e, "sign-in failed");
            e
        })?;
        self.set_session(session.clone());
        Ok(session)
    }

    /// URL that starts a social login with `provider`.
    pub fn sign_in_with_provider(&self, provider: OAuthProvider) -> Result<Url, AuthError> {
        self.provider.authorize_url(provider)
    }

    /// Adopts the tokens handed back by an OAuth redirect after checking
    /// them against the provider.
    pub async fn restore(
        &self,
        access_token: &str,
        refresh_token: Option<String>,
        expires_in: Option<i64>,
    ) -> Result<Session, AuthError> {
        let expires_at = expiry_after(Utc::now(), expires_in)?;
        let user = self.provider.get_user(access_token).await?;
        let session = Session {
            access_token: access_token.to_string(),
            refresh_token,
            expires_at,
            user,
        };
        self.set_session(session.clone());
        Ok(session)
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let token = lock(&self.current)
            .as_ref()
            .map(|s| s.access_token.clone())
            .ok_or(AuthError::NotSignedIn)?;

        self.provider.sign_out(&token).await.map_err(|e| {
            warn!(error = %e, "sign-out failed");
            e
        })?;

        *lock(&self.current) = None;
        info!("signed out");
        self.notify(&SessionEvent::SignedOut);
        Ok(())
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.listeners).push((id, Arc::new(listener)));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = lock(&self.listeners);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    fn set_session(&self, session: Session) {
        info!(user = %session.user.id, "signed in");
        *lock(&self.current) = Some(session.clone());
        self.notify(&SessionEvent::SignedIn(session));
    }

    fn notify(&self, event: &SessionEvent) {
        // Snapshot so listeners may subscribe or unsubscribe re-entrantly.
        let listeners: Vec<Listener> = lock(&self.listeners)
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
