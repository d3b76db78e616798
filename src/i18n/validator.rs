//! Catalog coverage validation.
//!
//! Compares a locale's tree against the fallback tree. A key path missing from
//! the candidate is still displayable (lookups fall through to the fallback),
//! but it is reported as an error so catalogs can be kept complete.

use crate::i18n::tree::{placeholders, TranslationTree};
use std::collections::BTreeMap;

/// Validation report containing errors and warnings about a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    /// Key paths of the reference missing from the candidate
    pub errors: Vec<String>,

    /// Extra paths, placeholder mismatches and empty strings
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// No errors and no warnings.
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

/// Validator for catalog completeness.
pub struct CoverageValidator;

impl CoverageValidator {
    /// Validate `candidate` against `reference` (normally the fallback locale).
    ///
    /// This checks that:
    /// - every reference key path exists in the candidate
    /// - the candidate has no key paths the reference lacks
    /// - each shared key uses the same `{placeholder}` names
    /// - no candidate string is empty
    pub fn validate(reference: &TranslationTree, candidate: &TranslationTree) -> ValidationReport {
        let mut report = ValidationReport::new();

        let reference_leaves: BTreeMap<String, &str> = reference.leaves().into_iter().collect();
        let candidate_leaves: BTreeMap<String, &str> = candidate.leaves().into_iter().collect();

        for (path, reference_text) in &reference_leaves {
            match candidate_leaves.get(path) {
                None => report.errors.push(format!("Missing key: {}", path)),
                Some(candidate_text) => {
                    let expected = placeholders(reference_text);
                    let found = placeholders(candidate_text);
                    if expected != found {
                        report.warnings.push(format!(
                            "Placeholder mismatch for {}: expected {:?}, found {:?}",
                            path, expected, found
                        ));
                    }
                }
            }
        }

        for (path, text) in &candidate_leaves {
            if !reference_leaves.contains_key(path) {
                report.warnings.push(format!("Unknown key: {}", path));
            }
            if text.trim().is_empty() {
                report.warnings.push(format!("Empty string: {}", path));
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(pairs: &[(&str, &str)]) -> TranslationTree {
        let mut tree = TranslationTree::new();
        for (path, text) in pairs {
            tree.insert(path, *text);
        }
        tree
    }

    #[test]
    fn test_identical_trees_are_clean() {
        let reference = tree(&[("error", "Error"), ("header.settings", "Settings")]);
        let report = CoverageValidator::validate(&reference, &reference.clone());
        assert!(report.is_clean());
    }

    #[test]
    fn test_missing_key_is_error() {
        let reference = tree(&[("error", "Error"), ("header.settings", "Settings")]);
        let candidate = tree(&[("error", "Erreur")]);
        let report = CoverageValidator::validate(&reference, &candidate);
        assert_eq!(report.errors, vec!["Missing key: header.settings"]);
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_extra_key_is_warning() {
        let reference = tree(&[("error", "Error")]);
        let candidate = tree(&[("error", "Erreur"), ("bonus", "Bonus")]);
        let report = CoverageValidator::validate(&reference, &candidate);
        assert!(!report.has_errors());
        assert_eq!(report.warnings, vec!["Unknown key: bonus"]);
    }

    #[test]
    fn test_placeholder_mismatch_is_warning() {
        let reference = tree(&[("status", "{count} games ready")]);
        let candidate = tree(&[("status", "{total} jeux prêts")]);
        let report = CoverageValidator::validate(&reference, &candidate);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Placeholder mismatch for status"));
    }

    #[test]
    fn test_empty_string_is_warning() {
        let reference = tree(&[("error", "Error")]);
        let candidate = tree(&[("error", "  ")]);
        let report = CoverageValidator::validate(&reference, &candidate);
        assert_eq!(report.warnings, vec!["Empty string: error"]);
    }

    #[test]
    fn test_namespace_replaced_by_leaf_reports_children_missing() {
        let reference = tree(&[("settings.title", "Settings"), ("settings.save", "Save")]);
        let candidate = tree(&[("settings", "Paramètres")]);
        let report = CoverageValidator::validate(&reference, &candidate);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.warnings, vec!["Unknown key: settings"]);
    }

    #[test]
    fn test_report_default_is_clean() {
        let report = ValidationReport::default();
        assert!(report.is_clean());
        assert_eq!(report, ValidationReport::new());
    }
}
