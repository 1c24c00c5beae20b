//! Shared HTTP client construction policy.
//!
//! Both the metadata lookup and the PDF download go through clients built
//! here, so timeouts, compression and proxy handling stay consistent.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy};
use thiserror::Error;
use tracing::warn;

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default whole-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Per-call timeouts applied to every outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// TCP/TLS connect timeout in seconds.
    pub connect_secs: u64,
    /// Total request timeout in seconds, body included.
    pub request_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl HttpTimeouts {
    /// Timeouts with an explicit request limit and the default connect limit.
    #[must_use]
    pub fn with_request_secs(request_secs: u64) -> Self {
        Self {
            request_secs,
            ..Self::default()
        }
    }
}

/// Failure to construct a `reqwest` client.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// The builder panicked twice, including the env-proxy fallback.
    #[error("HTTP client construction panicked while reading proxy settings")]
    Panicked,
    /// The builder returned an error.
    #[error("HTTP client construction failed: {0}")]
    Build(#[from] reqwest::Error),
}

/// Builds a client with the shared timeout and compression policy.
///
/// # Errors
///
/// Returns [`ClientBuildError`] when the client cannot be constructed.
pub(crate) fn build_http_client(
    user_agent: &str,
    timeouts: HttpTimeouts,
) -> Result<Client, ClientBuildError> {
    match try_build_client(user_agent, timeouts, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            // Some sandboxed environments panic while querying system proxy settings.
            warn!("HTTP client builder panicked; retrying with env-proxy fallback");
            match try_build_client(user_agent, timeouts, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Panic) => Err(ClientBuildError::Panicked),
                Err(BuildClientFailure::Build(error)) => Err(ClientBuildError::Build(error)),
            }
        }
        Err(BuildClientFailure::Build(error)) => Err(ClientBuildError::Build(error)),
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build_client(
    user_agent: &str,
    timeouts: HttpTimeouts,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    let user_agent = user_agent.to_string();
    let outcome = catch_unwind(AssertUnwindSafe(move || {
        let mut builder = base_builder(user_agent, timeouts);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build()
    }));

    match outcome {
        Ok(Ok(client)) => Ok(client),
        Ok(Err(error)) => Err(BuildClientFailure::Build(error)),
        Err(_) => Err(BuildClientFailure::Panic),
    }
}

fn base_builder(user_agent: String, timeouts: HttpTimeouts) -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .timeout(Duration::from_secs(timeouts.request_secs))
        .user_agent(user_agent)
        .gzip(true)
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    let names: &[&str] = match scheme {
        "https" => &["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"],
        "http" => &["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"],
        _ => return None,
    };
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}
