//! Date-capturing path patterns
//!
//! A pattern is a regular expression with exactly one capture group that
//! holds a `yyyymmdd` date. Paths that do not match are discarded; paths that
//! match but capture something that is not a date are treated as catalog drift.

use crate::fetcher::{CatalogError, CatalogResult};
use crate::CATALOG_DATE_FORMAT;
use chrono::NaiveDate;
use regex::Regex;

/// Compiled date-capturing pattern
#[derive(Debug, Clone)]
pub struct PathPattern {
    regex: Regex,
}

impl PathPattern {
    /// Compile a pattern, requiring exactly one capture group
    pub fn new(pattern: &str) -> CatalogResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| CatalogError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        // captures_len counts the implicit whole-match group
        if regex.captures_len() != 2 {
            return Err(CatalogError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: format!(
                    "expected exactly one capture group, found {}",
                    regex.captures_len() - 1
                ),
            });
        }

        Ok(Self { regex })
    }

    /// Pattern source
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Extract the captured date of a path
    ///
    /// Returns `Ok(None)` for paths that do not match.
    ///
    /// # Errors
    /// [`CatalogError::MalformedCatalogEntry`] when the path matches but the
    /// capture is not a `yyyymmdd` date
    pub fn extract_date(&self, path: &str) -> CatalogResult<Option<NaiveDate>> {
        let Some(captures) = self.regex.captures(path) else {
            return Ok(None);
        };

        let token = captures
            .get(1)
            .map(|m| m.as_str())
            .ok_or_else(|| CatalogError::MalformedCatalogEntry {
                path: path.to_string(),
                reason: "date group did not participate in the match".to_string(),
            })?;

        parse_catalog_date(token)
            .map(Some)
            .map_err(|reason| CatalogError::MalformedCatalogEntry {
                path: path.to_string(),
                reason,
            })
    }
}

/// Parse a `yyyymmdd` catalog date token
pub fn parse_catalog_date(token: &str) -> Result<NaiveDate, String> {
    if token.len() != 8 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{token}' is not a yyyymmdd date"));
    }

    NaiveDate::parse_from_str(token, CATALOG_DATE_FORMAT)
        .map_err(|e| format!("'{token}' is not a valid date: {e}"))
}
