//! Client-side auth state: the worker credential, mirrored into a cookie so it
//! survives restarts, and pushed into the [`ApiClient`] whenever it changes.

use anyhow::Result;

use super::persist::{Cookie, CookieJar, SameSite};
use crate::client::ApiClient;

pub const AUTH_COOKIE_NAME: &str = "worker_api_key";
/// Thirty days.
pub const AUTH_COOKIE_MAX_AGE: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub worker_api_key: String,
    pub is_authenticated: bool,
}

pub struct AuthStore<J> {
    state: AuthState,
    jar: J,
}

impl<J: CookieJar> AuthStore<J> {
    /// Starts unauthenticated. Call [`check_auth`](Self::check_auth) to pick up
    /// a credential persisted by an earlier run.
    pub fn new(jar: J) -> Self {
        Self {
            state: AuthState::default(),
            jar,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated
    }

    pub fn worker_api_key(&self) -> &str {
        &self.state.worker_api_key
    }

    pub fn jar(&self) -> &J {
        &self.jar
    }

    /// Store a credential. Whitespace is trimmed; an empty result changes
    /// nothing.
    pub fn set_credential(&mut self, value: &str, client: &mut ApiClient) -> Result<()> {
        let key = value.trim();
        if key.is_empty() {
            return Ok(());
        }

        self.jar.set(&Cookie {
            name: AUTH_COOKIE_NAME.to_string(),
            value: key.to_string(),
            path: "/".to_string(),
            max_age: AUTH_COOKIE_MAX_AGE,
            same_site: SameSite::Strict,
            secure: true,
        })?;
        client.set_api_key(key);
        self.state = AuthState {
            worker_api_key: key.to_string(),
            is_authenticated: true,
        };
        tracing::debug!("worker credential stored");
        Ok(())
    }

    /// Forget the credential and delete the cookie.
    pub fn logout(&mut self) -> Result<()> {
        self.jar.remove(AUTH_COOKIE_NAME)?;
        self.state = AuthState::default();
        Ok(())
    }

    /// Make sure the client carries a credential, preferring the one in memory
    /// and falling back to the cookie. Returns whether one was found.
    pub fn check_auth(&mut self, client: &mut ApiClient) -> bool {
        if self.state.is_authenticated && !self.state.worker_api_key.is_empty() {
            client.set_api_key(self.state.worker_api_key.as_str());
            return true;
        }

        let stored = match self.jar.get(AUTH_COOKIE_NAME) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read auth cookie");
                None
            }
        };

        match stored {
            Some(key) => {
                client.set_api_key(key.as_str());
                self.state = AuthState {
                    worker_api_key: key,
                    is_authenticated: true,
                };
                true
            }
            None => {
                self.state = AuthState::default();
                false
            }
        }
    }
}
