//! Login form state and login-username resolution.
//!
//! The login page carries two fields: the username the user types and a
//! hidden "confirmed full username". The client fills the hidden field from
//! the username cache on submit; the server picks which of the two (or the
//! cache itself) to authenticate against.

use tracing::debug;

use crate::config::AccountConfig;
use crate::identity::{lookup, reconcile, UsernameMapping, SEPARATOR};

/// Username to authenticate against for a submitted login form.
///
/// Priority: hidden confirmed field, then the cached mapping, then the
/// username as typed. The first two only count when they carry a
/// discriminator.
pub fn resolve_login_username(raw: &str, hidden: &str, mapping_blob: Option<&str>) -> String {
    let raw = raw.trim();
    let hidden = hidden.trim();

    if hidden.contains(SEPARATOR) {
        debug!(username = hidden, "using confirmed full username from form");
        return hidden.to_string();
    }

    if let Some(cached) = mapping_blob
        .and_then(|blob| lookup(blob, raw))
        .filter(|full| full.contains(SEPARATOR))
    {
        debug!(username = %cached, "using full username from cookie");
        return cached;
    }

    debug!(username = raw, "using username as typed");
    raw.to_string()
}

/// Who a login attempt is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginTarget {
    /// The administrator, who logs in without a discriminator.
    Admin,
    /// A regular account, by the resolved login name.
    User(String),
}

impl LoginTarget {
    /// Resolve the login name and classify it against the admin account.
    pub fn resolve(
        accounts: &AccountConfig,
        raw: &str,
        hidden: &str,
        mapping_blob: Option<&str>,
    ) -> Self {
        let username = resolve_login_username(raw, hidden, mapping_blob);
        if username.to_lowercase() == accounts.admin_username.to_lowercase() {
            LoginTarget::Admin
        } else {
            LoginTarget::User(username)
        }
    }
}

/// Values to prefill the login page with: `(full, base)` from the first
/// cached entry.
pub fn prefill(mapping_blob: Option<&str>) -> Option<(String, String)> {
    let mapping = UsernameMapping::decode(mapping_blob?).ok()?;
    mapping
        .first()
        .map(|(base, full)| (full.to_string(), base.to_string()))
}

/// The two login fields the reconciliation logic reads and writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    username: String,
    confirmed_full_username: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            confirmed_full_username: String::new(),
        }
    }

    /// Form as rendered with prefilled values.
    pub fn prefilled(username: impl Into<String>, confirmed_full_username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            confirmed_full_username: confirmed_full_username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn confirmed_full_username(&self) -> &str {
        &self.confirmed_full_username
    }

    /// Submit handler: confirm the cached full username for the typed name,
    /// or clear a stale confirmation so the server disambiguates.
    ///
    /// Returns whether the confirmation field is set afterwards.
    pub fn on_submit(&mut self, mapping_blob: Option<&str>) -> bool {
        let base = self.username.trim();
        if base.is_empty() {
            return !self.confirmed_full_username.is_empty();
        }

        match mapping_blob.and_then(|blob| reconcile(blob, base)) {
            Some(full) => {
                debug!(full = %full, "confirmed full username from cache");
                self.confirmed_full_username = full;
                true
            }
            None => {
                debug!("no cached full username, leaving it to the server");
                self.confirmed_full_username.clear();
                false
            }
        }
    }

    /// Input handler: a typed username that diverges from the confirmed one
    /// invalidates the confirmation.
    pub fn on_username_input(&mut self, value: impl Into<String>) {
        self.username = value.into();
        let current = self.username.trim();
        let confirmed = self.confirmed_full_username.trim();
        if !current.is_empty() && !confirmed.is_empty() && current != confirmed {
            self.confirmed_full_username.clear();
        }
    }

    /// Whether the "use full username" control should be offered.
    pub fn can_promote(&self) -> bool {
        !self.confirmed_full_username.trim().is_empty()
    }

    /// Replace the typed username with the confirmed full username.
    pub fn promote(&mut self) -> bool {
        if !self.can_promote() {
            return false;
        }
        self.username = self.confirmed_full_username.trim().to_string();
        true
    }
}
