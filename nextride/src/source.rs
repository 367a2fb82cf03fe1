//! The departure source capability.
//!
//! Two providers implement it: the live real-time feed and the scheduled
//! GTFS backend. Each owns its raw payload types and normalization; callers
//! only ever see [`DepartureQueryResult`].

use std::future::Future;

use crate::domain::{DepartureQueryResult, SourceKind, StopCode};

/// Why a source could not produce departures for a stop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The stop has no upcoming departures in this source. Expected and
    /// frequent: many stops have no live tracking, and tracked stops are
    /// often empty outside service hours.
    #[error("no departures")]
    NoData,

    /// Network failure, timeout, error status, unparseable body, or the
    /// source is not configured.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The body was well-formed JSON of the wrong shape.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// A provider of departures for a single stop.
pub trait DepartureSource: Send + Sync {
    /// Which kind of data this source yields.
    fn kind(&self) -> SourceKind;

    /// Fetch and normalize departures for `stop`.
    ///
    /// Never returns a successful result with zero departures; an empty
    /// board is [`SourceError::NoData`].
    fn fetch(
        &self,
        stop: &StopCode,
    ) -> impl Future<Output = Result<DepartureQueryResult, SourceError>> + Send;
}

/// Map a JSON decoding failure onto the source error taxonomy.
///
/// Syntax errors and truncated bodies are transport-level problems; valid
/// JSON of the wrong shape is a schema violation.
pub(crate) fn classify_json_error(err: &serde_json::Error, body: &str) -> SourceError {
    use serde_json::error::Category;

    match err.classify() {
        Category::Data => SourceError::Malformed(format!(
            "{err} (body: {})",
            body.chars().take(200).collect::<String>()
        )),
        Category::Syntax | Category::Eof | Category::Io => {
            SourceError::Unavailable(format!("unparseable response: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    #[allow(dead_code)]
    struct Shape {
        items: Vec<u32>,
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let body = r#"{"items": "not a list"}"#;
        let err = serde_json::from_str::<Shape>(body).unwrap_err();
        assert!(matches!(
            classify_json_error(&err, body),
            SourceError::Malformed(_)
        ));
    }

    #[test]
    fn truncated_body_is_unavailable() {
        let body = r#"{"items": [1, 2"#;
        let err = serde_json::from_str::<Shape>(body).unwrap_err();
        assert!(matches!(
            classify_json_error(&err, body),
            SourceError::Unavailable(_)
        ));
    }

    #[test]
    fn html_error_page_is_unavailable() {
        let body = "<html>502 Bad Gateway</html>";
        let err = serde_json::from_str::<Shape>(body).unwrap_err();
        assert!(matches!(
            classify_json_error(&err, body),
            SourceError::Unavailable(_)
        ));
    }

    #[test]
    fn error_display() {
        assert_eq!(SourceError::NoData.to_string(), "no departures");
        assert_eq!(
            SourceError::Unavailable("timed out".into()).to_string(),
            "source unavailable: timed out"
        );
    }
}
