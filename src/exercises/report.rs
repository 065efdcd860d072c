//! Validation report for a whole exercise set
//!
//! Read-only summary used by the CLI and logs; filtering itself happens in
//! [`AnswerValidator::filter_set`](super::validator::AnswerValidator::filter_set).

use serde::{Deserialize, Serialize};

use super::types::ExerciseSet;
use super::validator::{AnswerValidator, ValidationIssue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemReport {
    pub index: usize,
    pub prompt: String,
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub all_valid: bool,
    pub details: Vec<ItemReport>,
}

impl ValidationReport {
    pub fn for_set(validator: &AnswerValidator, set: &ExerciseSet) -> Self {
        let details: Vec<ItemReport> = set
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let issues = validator.check_item(item, set.category);
                ItemReport {
                    index,
                    prompt: item.prompt().to_string(),
                    valid: !issues.iter().any(ValidationIssue::is_error),
                    issues,
                }
            })
            .collect();

        let valid = details.iter().filter(|d| d.valid).count();
        Self {
            total: details.len(),
            valid,
            invalid: details.len() - valid,
            all_valid: valid == details.len(),
            details,
        }
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}/{} items valid", self.valid, self.total)?;
        for detail in &self.details {
            let mark = if detail.valid { "ok" } else { "INVALID" };
            writeln!(f, "  [{}] {} {}", detail.index + 1, mark, detail.prompt)?;
            for issue in &detail.issues {
                writeln!(f, "      {:?} {}: {}", issue.severity, issue.field, issue.message)?;
            }
        }
        Ok(())
    }
}
