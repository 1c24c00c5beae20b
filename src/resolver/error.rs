//! Error types for resolver construction.
//!
//! These abort the whole run: they mean the resolver cannot send a valid
//! request at all, as opposed to per-DOI lookup failures.

use thiserror::Error;

/// Errors raised while setting up a resolver.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// No contact email was configured.
    #[error(
        "no contact email configured for the open-access lookup service\n  Suggestion: pass --email, set PAPERFETCH_EMAIL, or add contact_email to the config file"
    )]
    MissingContactEmail,

    /// The configured contact email cannot be sent.
    #[error("invalid contact email '{email}': {reason}\n  Suggestion: {suggestion}")]
    InvalidContactEmail {
        /// The rejected value.
        email: String,
        /// Why it was rejected.
        reason: String,
        /// How to fix it.
        suggestion: String,
    },

    /// The HTTP client for a resolver could not be built.
    #[error("{resolver} resolver unavailable: {reason}")]
    ClientUnavailable {
        /// Resolver name.
        resolver: String,
        /// Underlying cause.
        reason: String,
    },
}

impl ResolveError {
    /// Creates an `InvalidContactEmail` error.
    #[must_use]
    pub fn invalid_email(email: &str, reason: &str) -> Self {
        Self::InvalidContactEmail {
            email: email.escape_debug().to_string(),
            reason: reason.to_string(),
            suggestion: "Use a plain address such as name@example.org".to_string(),
        }
    }

    /// Creates a `ClientUnavailable` error.
    #[must_use]
    pub fn client_unavailable(resolver: &str, reason: &str) -> Self {
        Self::ClientUnavailable {
            resolver: resolver.to_string(),
            reason: reason.to_string(),
        }
    }
}
