//! Output sanitizer
//!
//! Models sometimes wrap structured output in a markdown code fence even
//! when told not to. This strips one optional leading fence (with or
//! without a `json` tag) and one optional trailing fence, then trims.
//! Pure text transform; parsing raises the authoritative error downstream.

/// Strip optional code-fence wrapping from raw model text
///
/// Input already free of fences comes back trimmed and otherwise unchanged.
/// A missing or malformed closing fence is tolerated: the best-effort
/// trimmed text is returned rather than an error.
pub fn sanitize(raw: &str) -> String {
    let text = raw.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text.to_string();
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim().to_string()
}
