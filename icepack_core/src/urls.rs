use url::Url;

use crate::CoreError;

/// Validate a base URI and make sure it ends with exactly one `/`.
///
/// Path suffixes from the model registry are appended verbatim, so
/// `https://api.icepack.ai` and `https://api.icepack.ai/` must resolve the same.
pub fn normalize_base_uri(base_uri: &str) -> Result<String, CoreError> {
    let trimmed = base_uri.trim();
    if trimmed.is_empty() {
        return Err(CoreError::config("endpoint must not be empty"));
    }
    let parsed = Url::parse(trimmed)?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(CoreError::InvalidInput(format!(
                "unsupported scheme: {other}"
            )))
        }
    }
    Ok(format!("{}/", trimmed.trim_end_matches('/')))
}

/// Join a resolved endpoint with a suffix (the registry path or a job id).
pub fn join(endpoint: &str, suffix: &str) -> String {
    format!("{endpoint}{suffix}")
}
