//! Plaintext credential verification.
//!
//! Stored secrets are compared verbatim after two normalizations applied to
//! both sides: non-breaking spaces become ordinary spaces, and trailing
//! whitespace is dropped. The comparison is neither hashed nor constant-time.
//! Moving to hashed secrets changes the stored data format and needs a
//! product decision first.
//!
//! # Security
//! - Secrets are held in `Zeroizing` containers while compared
//! - The stored secret is never returned, logged or serialized
//! - Blank input is rejected before the store is contacted

use crate::models::{Credential, Record};
use crate::queries::fixed;
use crate::store::RecordStore;
use serde_json::Value as JsonValue;
use zeroize::Zeroizing;

/// Normalizes a secret for comparison.
pub fn normalize_secret(secret: &str) -> Zeroizing<String> {
    let replaced = Zeroizing::new(secret.replace('\u{00A0}', " "));
    Zeroizing::new(replaced.trim_end().to_string())
}

/// True when both secrets are equal after normalization.
pub fn secrets_match(stored: &str, submitted: &str) -> bool {
    *normalize_secret(stored) == *normalize_secret(submitted)
}

/// Verifies logins against the `User_Login` table.
pub struct CredentialVerifier<'s> {
    store: &'s dyn RecordStore,
}

impl<'s> CredentialVerifier<'s> {
    /// Verifier over `store`.
    pub const fn new(store: &'s dyn RecordStore) -> Self {
        Self { store }
    }

    /// Returns the credential when `username` exists and `secret` matches.
    ///
    /// Any store failure is logged and treated as "no match".
    pub async fn verify(&self, username: &str, secret: &str) -> Option<Credential> {
        let username = username.trim();
        let secret = Zeroizing::new(secret.trim().to_string());
        if username.is_empty() || secret.is_empty() {
            tracing::debug!("Rejected blank credentials without a lookup");
            return None;
        }

        let mut session = match self.store.acquire().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Credential lookup could not reach the store: {}", e);
                return None;
            }
        };

        let relation = match session.fetch_all(&fixed::credential(username)).await {
            Ok(relation) => relation,
            Err(e) => {
                tracing::warn!("Credential lookup failed: {}", e);
                return None;
            }
        };
        drop(session);

        let Some(mut row) = relation.rows.into_iter().next() else {
            tracing::debug!("No login named '{}'", username);
            return None;
        };

        let stored = take_secret(&mut row);
        if !secrets_match(&stored, &secret) {
            tracing::debug!("Secret mismatch for login '{}'", username);
            return None;
        }

        tracing::info!("Login '{}' verified", username);
        Some(Credential {
            username: text(&row, "Username").unwrap_or_else(|| username.to_string()),
            role: text(&row, "Role").unwrap_or_default(),
            linked_id: linked_id(&row),
        })
    }
}

/// Moves the stored secret out of the row so it never outlives this check.
fn take_secret(row: &mut Record) -> Zeroizing<String> {
    match row.remove("Password") {
        Some(JsonValue::String(secret)) => Zeroizing::new(secret),
        Some(JsonValue::Null) | None => Zeroizing::new(String::new()),
        Some(other) => Zeroizing::new(other.to_string()),
    }
}

fn text(row: &Record, label: &str) -> Option<String> {
    match row.get(label)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Null => None,
        other => Some(other.to_string()),
    }
}

fn linked_id(row: &Record) -> Option<i64> {
    match row.get("Linked_ID")? {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
