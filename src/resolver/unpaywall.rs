//! Unpaywall resolver: DOI to best open-access PDF URL.
//!
//! Queries `GET {base}/v2/{doi}?email={contact}` and reads
//! `best_oa_location.url_for_pdf`. The contact email is mandatory under the
//! service's usage policy, so construction fails without one.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::fetch::FetchError;
use crate::http_client::{HttpTimeouts, build_http_client};
use crate::user_agent;

use super::{PdfLocator, ResolveError};

/// Production Unpaywall API base URL.
pub const DEFAULT_UNPAYWALL_BASE_URL: &str = "https://api.unpaywall.org";

// ==================== Unpaywall API Response Types ====================

/// Top-level `/v2/{doi}` response; only the fields we read.
#[derive(Debug, Deserialize)]
pub(crate) struct UnpaywallResponse {
    #[serde(default)]
    pub is_oa: Option<bool>,
    #[serde(default)]
    pub best_oa_location: Option<OaLocation>,
}

/// One open-access location entry.
#[derive(Debug, Deserialize)]
pub(crate) struct OaLocation {
    #[serde(default)]
    pub url_for_pdf: Option<String>,
    #[serde(default)]
    pub host_type: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

// ==================== UnpaywallResolver ====================

/// Looks up open-access PDF locations through the Unpaywall API.
pub struct UnpaywallResolver {
    client: Client,
    base_url: String,
    email: String,
}

impl UnpaywallResolver {
    /// Creates a resolver against the production API.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::MissingContactEmail`] for an empty email,
    /// [`ResolveError::InvalidContactEmail`] for an unusable one, and
    /// [`ResolveError::ClientUnavailable`] if the HTTP client cannot be built.
    #[tracing::instrument(skip_all)]
    pub fn new(email: &str, timeouts: HttpTimeouts) -> Result<Self, ResolveError> {
        Self::with_base_url(email, DEFAULT_UNPAYWALL_BASE_URL, timeouts)
    }

    /// Creates a resolver with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`UnpaywallResolver::new`].
    #[tracing::instrument(skip_all, fields(base_url = %base_url.as_ref()))]
    pub fn with_base_url(
        email: &str,
        base_url: impl AsRef<str>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, ResolveError> {
        let email = validate_contact_email(email)?;
        let client = build_http_client(&user_agent::lookup_user_agent(&email), timeouts)
            .map_err(|e| ResolveError::client_unavailable("unpaywall", &e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
            email,
        })
    }

    /// The contact email sent with every lookup.
    #[must_use]
    pub fn contact_email(&self) -> &str {
        &self.email
    }

    /// Builds the lookup URL for `doi`.
    ///
    /// The DOI goes into the path as-is; the email is query-encoded.
    #[must_use]
    pub fn lookup_url(&self, doi: &str) -> String {
        format!(
            "{}/v2/{}?email={}",
            self.base_url,
            doi,
            urlencoding::encode(&self.email)
        )
    }
}

impl std::fmt::Debug for UnpaywallResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnpaywallResolver")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PdfLocator for UnpaywallResolver {
    fn name(&self) -> &'static str {
        "unpaywall"
    }

    #[tracing::instrument(skip(self), fields(resolver = "unpaywall"))]
    async fn locate(&self, doi: &str) -> Result<String, FetchError> {
        let doi = doi.trim();
        if doi.is_empty() {
            return Err(FetchError::lookup_failed(doi, None, "empty DOI"));
        }

        let url = self.lookup_url(doi);
        debug!(api_url = %url, "calling Unpaywall API");

        let response = self.client.get(&url).send().await.map_err(|e| {
            let detail = if e.is_timeout() {
                "Unpaywall API request timed out".to_string()
            } else {
                format!("cannot reach Unpaywall API: {e}")
            };
            warn!(error = %e, "Unpaywall API request failed");
            FetchError::lookup_failed(doi, None, detail)
        })?;

        let status = response.status();
        if !status.is_success() {
            let code = status.as_u16();
            let detail = match code {
                404 => "DOI not found by the lookup service (HTTP 404)".to_string(),
                422 => "lookup service rejected the DOI or email (HTTP 422)".to_string(),
                429 => "lookup service rate limit exceeded (HTTP 429)".to_string(),
                s if s >= 500 => format!("lookup service unavailable (HTTP {s})"),
                s => format!("lookup service returned HTTP {s}"),
            };
            debug!(status = code, %detail, "Unpaywall API error");
            return Err(FetchError::lookup_failed(doi, Some(code), detail));
        }

        let body = response.json::<UnpaywallResponse>().await.map_err(|e| {
            warn!(error = %e, "failed to parse Unpaywall response JSON");
            FetchError::lookup_failed(
                doi,
                Some(status.as_u16()),
                format!("unexpected lookup response format: {e}"),
            )
        })?;

        best_pdf_url(&body).ok_or_else(|| {
            debug!(is_oa = ?body.is_oa, "no url_for_pdf in best_oa_location");
            FetchError::no_open_access(doi)
        })
    }
}

/// Returns the non-empty `best_oa_location.url_for_pdf`, if any.
fn best_pdf_url(response: &UnpaywallResponse) -> Option<String> {
    let location = response.best_oa_location.as_ref()?;
    let url = location.url_for_pdf.as_deref()?.trim();
    if url.is_empty() {
        return None;
    }
    debug!(
        pdf_url = %url,
        host_type = ?location.host_type,
        version = ?location.version,
        "best open-access location found"
    );
    Some(url.to_string())
}

fn validate_contact_email(email: &str) -> Result<String, ResolveError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(ResolveError::MissingContactEmail);
    }
    if trimmed.chars().any(char::is_control) {
        return Err(ResolveError::invalid_email(
            trimmed,
            "contains control characters",
        ));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(ResolveError::invalid_email(trimmed, "contains whitespace"));
    }
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            Ok(trimmed.to_string())
        }
        _ => Err(ResolveError::invalid_email(trimmed, "missing '@'")),
    }
}
