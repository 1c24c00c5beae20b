//! User-Agent strings for outbound requests.

/// Download requests identify the tool only.
#[must_use]
pub(crate) fn download_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("paperfetch/{version} (open-access-fetcher)")
}

/// Metadata lookups also carry the configured contact address.
#[must_use]
pub(crate) fn lookup_user_agent(contact_email: &str) -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("paperfetch/{version} (open-access-fetcher; mailto:{contact_email})")
}
