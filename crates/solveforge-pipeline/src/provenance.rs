//! Provenance extractor
//!
//! Pulls citation metadata out of a model envelope into normalized
//! grounding sources. Partial provenance is expected: entries without a
//! usable URI are dropped, not errors.

use url::Url;

use solveforge_types::GroundingSource;

use crate::client::ModelEnvelope;

/// Extract grounding sources from a model envelope
///
/// Returns `None` when the envelope carries no provenance structure at all,
/// so callers can tell "no grounding attempted" from "grounding attempted,
/// zero usable sources". Titles fall back to the URI host when the model
/// did not supply one. Idempotent: the envelope is never mutated.
pub fn extract_sources(envelope: &ModelEnvelope) -> Option<Vec<GroundingSource>> {
    let metadata = envelope.grounding.as_ref()?;

    let sources = metadata
        .chunks
        .iter()
        .filter_map(|chunk| {
            let web = chunk.web.as_ref()?;
            let uri = web.uri.as_deref()?.trim();
            if uri.is_empty() {
                return None;
            }
            // The invariant is a well-formed absolute URI; anything else is
            // dropped the same way entries with no URI are.
            let parsed = Url::parse(uri).ok()?;
            let title = match web.title.as_deref().map(str::trim) {
                Some(title) if !title.is_empty() => title.to_string(),
                _ => parsed.host_str().unwrap_or(uri).to_string(),
            };
            Some(GroundingSource {
                uri: uri.to_string(),
                title,
            })
        })
        .collect();

    Some(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{GroundingChunk, GroundingMetadata, WebAnchor};

    fn envelope(chunks: Vec<GroundingChunk>) -> ModelEnvelope {
        ModelEnvelope {
            text: "{}".to_string(),
            grounding: Some(GroundingMetadata { chunks }),
        }
    }

    fn chunk(uri: Option<&str>, title: Option<&str>) -> GroundingChunk {
        GroundingChunk {
            web: Some(WebAnchor {
                uri: uri.map(String::from),
                title: title.map(String::from),
            }),
        }
    }

    #[test]
    fn test_absent_marker_when_no_provenance_structure() {
        let envelope = ModelEnvelope {
            text: "{}".to_string(),
            grounding: None,
        };
        assert!(extract_sources(&envelope).is_none());
    }

    #[test]
    fn test_grounded_but_unusable_yields_empty_list() {
        let sources = extract_sources(&envelope(vec![chunk(Some(""), Some("Empty"))])).unwrap();
        assert!(sources.is_empty());
    }

    #[test]
    fn test_title_falls_back_to_host() {
        let sources =
            extract_sources(&envelope(vec![chunk(Some("https://example.com/report"), None)]))
                .unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title, "example.com");
        assert_eq!(sources[0].uri, "https://example.com/report");
    }

    #[test]
    fn test_explicit_title_is_kept() {
        let sources = extract_sources(&envelope(vec![chunk(
            Some("https://example.com/report"),
            Some("Market Report 2026"),
        )]))
        .unwrap();
        assert_eq!(sources[0].title, "Market Report 2026");
    }

    #[test]
    fn test_malformed_uri_is_dropped() {
        let sources = extract_sources(&envelope(vec![
            chunk(Some("not a uri"), Some("Bad")),
            chunk(Some("https://example.com/good"), Some("Good")),
        ]))
        .unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title, "Good");
    }

    #[test]
    fn test_chunk_without_web_anchor_is_dropped() {
        let sources = extract_sources(&envelope(vec![GroundingChunk { web: None }])).unwrap();
        assert!(sources.is_empty());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let envelope = envelope(vec![
            chunk(Some("https://example.com/a"), Some("A")),
            chunk(None, None),
            chunk(Some("https://example.org/b"), None),
        ]);
        let first = extract_sources(&envelope);
        let second = extract_sources(&envelope);
        assert_eq!(first, second);
    }
}
