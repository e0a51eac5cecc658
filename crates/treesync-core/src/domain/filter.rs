//! Path filters for sync folders
//!
//! A [`FilterConfiguration`] is the serializable form (include and exclude
//! glob lists); [`PathFilter`] is the compiled form used while synchronizing.
//! Patterns are matched case-insensitively, exclusions win over inclusions,
//! and an empty include list includes everything.

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::errors::DomainError;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Include/exclude glob patterns for one sync folder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfiguration {
    /// Patterns a path must match to be synchronized (empty: everything)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    /// Patterns that exclude a path even if it is included
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl FilterConfiguration {
    /// The filter that lets every path through
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Builder: add an include pattern
    #[must_use]
    pub fn including(mut self, pattern: impl Into<String>) -> Self {
        self.include.push(pattern.into());
        self
    }

    /// Builder: add an exclude pattern
    #[must_use]
    pub fn excluding(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// Check that every pattern compiles
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidPattern`] for the first bad pattern
    pub fn validate(&self) -> Result<(), DomainError> {
        self.compile().map(|_| ())
    }

    /// Compile into a [`PathFilter`]
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidPattern`] for the first bad pattern
    pub fn compile(&self) -> Result<PathFilter, DomainError> {
        Ok(PathFilter {
            include: compile_all(&self.include)?,
            exclude: compile_all(&self.exclude)?,
        })
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Pattern>, DomainError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|e| DomainError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Compiled path filter
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl PathFilter {
    /// A filter that matches every path
    #[must_use]
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Whether `path` passes the filter
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        if let Some(pattern) = self
            .exclude
            .iter()
            .find(|p| p.matches_with(path, MATCH_OPTIONS))
        {
            trace!(path = %path, pattern = %pattern, "Path excluded by filter");
            return false;
        }
        self.include.is_empty()
            || self
                .include
                .iter()
                .any(|p| p.matches_with(path, MATCH_OPTIONS))
    }
}

impl TryFrom<&FilterConfiguration> for PathFilter {
    type Error = DomainError;

    fn try_from(config: &FilterConfiguration) -> Result<Self, Self::Error> {
        config.compile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = FilterConfiguration::empty().compile().unwrap();
        assert!(filter.matches("a.txt"));
        assert!(filter.matches("deep/nested/file.bin"));
        assert!(PathFilter::allow_all().matches("x"));
    }

    #[test]
    fn test_include_and_exclude() {
        let filter = FilterConfiguration::empty()
            .including("docs/**")
            .including("*.md")
            .excluding("**/*.tmp")
            .compile()
            .unwrap();

        assert!(filter.matches("docs/report.pdf"));
        assert!(filter.matches("README.md"));
        assert!(filter.matches("DOCS/Report.pdf"));
        assert!(!filter.matches("docs/scratch.tmp"));
        assert!(!filter.matches("src/main.rs"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let config = FilterConfiguration::empty().excluding("[unclosed");
        assert!(matches!(
            config.validate(),
            Err(DomainError::InvalidPattern { pattern, .. }) if pattern == "[unclosed"
        ));
    }

    #[test]
    fn test_yaml_roundtrip_omits_empty_lists() {
        let config = FilterConfiguration::empty().excluding("*.bak");
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("include"));
        let parsed: FilterConfiguration = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
