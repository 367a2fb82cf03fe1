//! Stop codes and catalog entries.

use std::fmt;

use serde::Serialize;

use super::Coordinate;

/// Error returned when parsing an invalid stop code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop code: {reason}")]
pub struct InvalidStopCode {
    reason: &'static str,
}

/// An opaque provider-specific stop identifier.
///
/// Codes are non-empty and consist of ASCII letters, digits, `_`, `-` or
/// `:`. Case is preserved because the real-time provider is case-sensitive.
///
/// # Examples
///
/// ```
/// use nextride::domain::StopCode;
///
/// let code = StopCode::parse("HlmSpa").unwrap();
/// assert_eq!(code.as_str(), "HlmSpa");
///
/// assert!(StopCode::parse("").is_err());
/// assert!(StopCode::parse("../etc").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StopCode(String);

impl StopCode {
    /// Maximum accepted length; provider codes are far shorter.
    const MAX_LEN: usize = 64;

    /// Parse a stop code, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidStopCode> {
        let s = s.trim();

        if s.is_empty() {
            return Err(InvalidStopCode {
                reason: "must not be empty",
            });
        }

        if s.len() > Self::MAX_LEN {
            return Err(InvalidStopCode {
                reason: "too long",
            });
        }

        if !s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b':'))
        {
            return Err(InvalidStopCode {
                reason: "must be ASCII letters, digits, '_', '-' or ':'",
            });
        }

        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopCode({})", self.0)
    }
}

impl fmt::Display for StopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A physical stop (or stop area) from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    pub code: StopCode,
    pub name: String,
    /// Town or municipality, when the provider supplies one.
    pub town: Option<String>,
    pub location: Coordinate,
}

impl Stop {
    /// Name for display, qualified with the town when known.
    pub fn display_name(&self) -> String {
        match &self.town {
            Some(town) if !town.is_empty() && !self.name.starts_with(town.as_str()) => {
                format!("{}, {}", town, self.name)
            }
            _ => self.name.clone(),
        }
    }
}

/// A stop paired with its distance from a query origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedStop {
    pub stop: Stop,
    pub distance_km: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_codes() {
        assert!(StopCode::parse("hlmcen").is_ok());
        assert!(StopCode::parse("55000310").is_ok());
        assert!(StopCode::parse("NL:S:haarlem_spaarne").is_ok());
        assert!(StopCode::parse("ams-cs").is_ok());
    }

    #[test]
    fn parse_trims_whitespace() {
        let code = StopCode::parse("  hlmcen \n").unwrap();
        assert_eq!(code.as_str(), "hlmcen");
    }

    #[test]
    fn reject_invalid_codes() {
        assert!(StopCode::parse("").is_err());
        assert!(StopCode::parse("   ").is_err());
        assert!(StopCode::parse("hlm cen").is_err());
        assert!(StopCode::parse("hlm/cen").is_err());
        assert!(StopCode::parse("hlm?x=1").is_err());
        assert!(StopCode::parse(&"a".repeat(65)).is_err());
    }

    #[test]
    fn preserves_case() {
        assert_ne!(
            StopCode::parse("HlmSpa").unwrap(),
            StopCode::parse("hlmspa").unwrap()
        );
    }

    #[test]
    fn debug_and_display() {
        let code = StopCode::parse("hlmcen").unwrap();
        assert_eq!(format!("{code}"), "hlmcen");
        assert_eq!(format!("{code:?}"), "StopCode(hlmcen)");
    }

    #[test]
    fn display_name_includes_town() {
        let mut stop = Stop {
            code: StopCode::parse("hlmspa").unwrap(),
            name: "Spaarne".to_string(),
            town: Some("Haarlem".to_string()),
            location: Coordinate::new(52.38, 4.64).unwrap(),
        };
        assert_eq!(stop.display_name(), "Haarlem, Spaarne");

        stop.name = "Haarlem, Station".to_string();
        assert_eq!(stop.display_name(), "Haarlem, Station");

        stop.town = None;
        assert_eq!(stop.display_name(), "Haarlem, Station");
    }
}
