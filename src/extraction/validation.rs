use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Error, ExtractedField, Result};

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$";

/// Score below which a generic review suggestion is appended.
const SUGGESTION_THRESHOLD: f32 = 0.8;

/// Expected type of a validated field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free-form text; length bounds produce warnings, not errors
    String,
    /// Parsed as a float; bounds produce errors
    Number,
    /// Checked against a standard email pattern
    Email,
}

/// A single validation rule for one field of a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Field the rule applies to
    pub field_name: String,
    /// Missing or empty value is an error when set
    pub required: bool,
    /// Expected value type
    pub field_type: FieldType,
    /// Minimum string length (warning)
    pub min_length: Option<usize>,
    /// Maximum string length (warning)
    pub max_length: Option<usize>,
    /// Minimum numeric value (error)
    pub min_value: Option<f64>,
    /// Maximum numeric value (error)
    pub max_value: Option<f64>,
    /// Closed set of allowed values (error when outside)
    pub allowed_values: Option<Vec<String>>,
    /// Extra regex the value must match (error on mismatch)
    pub pattern: Option<String>,
}

/// Outcome of evaluating a rule set against a fused field list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleValidationResult {
    /// True when no errors were produced
    pub is_valid: bool,
    /// Fraction of rules whose field was present and error-free
    pub score: f32,
    /// Hard findings
    pub errors: Vec<String>,
    /// Soft findings (string length bounds)
    pub warnings: Vec<String>,
    /// Advisory follow-ups
    pub suggestions: Vec<String>,
    /// Errors grouped by field name, for per-field attachment
    pub field_errors: HashMap<String, Vec<String>>,
}

/// Checks fused fields against per-template validation rules.
///
/// Validation findings never fail a job; they are folded into the job result
/// as errors/warnings and lower the validation score.
pub struct RuleValidator {
    email_re: Regex,
}

impl RuleValidator {
    /// Create a validator. Fails only if the built-in email pattern cannot
    /// compile, which would be a packaging defect.
    pub fn new() -> Result<Self> {
        let email_re = Regex::new(EMAIL_PATTERN).map_err(|e| Error::Config(e.to_string()))?;
        Ok(Self { email_re })
    }

    /// Evaluate every rule against the field list.
    pub fn validate(&self, fields: &[ExtractedField], rules: &[ValidationRule]) -> Result<RuleValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut field_errors: HashMap<String, Vec<String>> = HashMap::new();
        let mut satisfied = 0usize;

        let by_name: HashMap<&str, &ExtractedField> =
            fields.iter().map(|f| (f.field_name.as_str(), f)).collect();

        for rule in rules {
            let value = by_name.get(rule.field_name.as_str()).map(|f| f.value.as_str());
            let mut rule_errors = Vec::new();

            match value {
                None | Some("") => {
                    if rule.required {
                        rule_errors.push(format!("{} is required", rule.field_name));
                    }
                }
                Some(value) => {
                    self.check_value(rule, value, &mut rule_errors, &mut warnings)?;
                    if rule_errors.is_empty() {
                        satisfied += 1;
                    }
                }
            }

            if !rule_errors.is_empty() {
                field_errors
                    .entry(rule.field_name.clone())
                    .or_default()
                    .extend(rule_errors.iter().cloned());
                errors.extend(rule_errors);
            }
        }

        let score = if rules.is_empty() {
            0.0
        } else {
            satisfied as f32 / rules.len() as f32
        };

        let mut suggestions = Vec::new();
        if score < SUGGESTION_THRESHOLD {
            suggestions.push("Some fields could not be validated. Consider reviewing the extracted data manually.".to_string());
        }

        debug!(score, errors = errors.len(), warnings = warnings.len(), "rule validation finished");

        Ok(RuleValidationResult {
            is_valid: errors.is_empty(),
            score,
            errors,
            warnings,
            suggestions,
            field_errors,
        })
    }

    fn check_value(
        &self,
        rule: &ValidationRule,
        value: &str,
        errors: &mut Vec<String>,
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        match rule.field_type {
            FieldType::Email => {
                if !self.email_re.is_match(value) {
                    errors.push(format!("{} must be a valid email address", rule.field_name));
                }
            }
            FieldType::Number => match value.parse::<f64>() {
                Ok(number) => {
                    if let Some(min) = rule.min_value {
                        if number < min {
                            errors.push(format!("{} must be at least {}", rule.field_name, min));
                        }
                    }
                    if let Some(max) = rule.max_value {
                        if number > max {
                            errors.push(format!("{} must be at most {}", rule.field_name, max));
                        }
                    }
                }
                Err(_) => {
                    errors.push(format!("{} must be a number", rule.field_name));
                }
            },
            FieldType::String => {
                if let Some(min) = rule.min_length {
                    if value.len() < min {
                        warnings.push(format!("{} is shorter than {} characters", rule.field_name, min));
                    }
                }
                if let Some(max) = rule.max_length {
                    if value.len() > max {
                        warnings.push(format!("{} is longer than {} characters", rule.field_name, max));
                    }
                }
            }
        }

        if let Some(allowed) = &rule.allowed_values {
            if !allowed.iter().any(|candidate| candidate == value) {
                errors.push(format!("{} must be one of: {}", rule.field_name, allowed.join(", ")));
            }
        }

        if let Some(pattern) = &rule.pattern {
            let re = Regex::new(pattern)
                .map_err(|e| Error::Config(format!("invalid validation pattern for {}: {}", rule.field_name, e)))?;
            if !re.is_match(value) {
                errors.push(format!("{} does not match the expected format", rule.field_name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldSource;

    fn field(name: &str, value: &str) -> ExtractedField {
        ExtractedField::new(name, value, 0.9, FieldSource::Pattern)
    }

    fn string_rule(name: &str, required: bool) -> ValidationRule {
        ValidationRule {
            field_name: name.to_string(),
            required,
            field_type: FieldType::String,
            min_length: None,
            max_length: None,
            min_value: None,
            max_value: None,
            allowed_values: None,
            pattern: None,
        }
    }

    #[test]
    fn test_invalid_email_yields_single_error() {
        let validator = RuleValidator::new().unwrap();
        let rules = vec![ValidationRule {
            field_name: "submitter_email".to_string(),
            required: true,
            field_type: FieldType::Email,
            min_length: None,
            max_length: None,
            min_value: None,
            max_value: None,
            allowed_values: None,
            pattern: None,
        }];
        let fields = vec![field("submitter_email", "not-an-email")];

        let result = validator.validate(&fields, &rules).unwrap();
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("submitter_email"));
        assert_eq!(result.field_errors["submitter_email"].len(), 1);
    }

    #[test]
    fn test_score_boundary_no_suggestion_at_exactly_point_eight() {
        let validator = RuleValidator::new().unwrap();
        let rules: Vec<ValidationRule> = (0..5).map(|i| string_rule(&format!("f{}", i), false)).collect();
        // 4 of 5 fields present and valid
        let fields: Vec<ExtractedField> = (0..4).map(|i| field(&format!("f{}", i), "value")).collect();

        let result = validator.validate(&fields, &rules).unwrap();
        assert!((result.score - 0.8).abs() < 1e-6);
        assert!(result.suggestions.is_empty());
        assert!(result.is_valid);
    }

    #[test]
    fn test_suggestion_below_threshold() {
        let validator = RuleValidator::new().unwrap();
        let rules: Vec<ValidationRule> = (0..5).map(|i| string_rule(&format!("f{}", i), false)).collect();
        let fields: Vec<ExtractedField> = (0..3).map(|i| field(&format!("f{}", i), "value")).collect();

        let result = validator.validate(&fields, &rules).unwrap();
        assert!(result.score < 0.8);
        assert_eq!(result.suggestions.len(), 1);
    }

    #[test]
    fn test_required_missing_field() {
        let validator = RuleValidator::new().unwrap();
        let rules = vec![string_rule("sample_name", true)];
        let result = validator.validate(&[], &rules).unwrap();
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["sample_name is required"]);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_number_bounds() {
        let validator = RuleValidator::new().unwrap();
        let rules = vec![ValidationRule {
            field_name: "concentration".to_string(),
            required: false,
            field_type: FieldType::Number,
            min_length: None,
            max_length: None,
            min_value: Some(0.0),
            max_value: Some(100.0),
            allowed_values: None,
            pattern: None,
        }];

        let result = validator.validate(&[field("concentration", "250")], &rules).unwrap();
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("at most"));

        let result = validator.validate(&[field("concentration", "abc")], &rules).unwrap();
        assert!(result.errors[0].contains("must be a number"));

        let result = validator.validate(&[field("concentration", "42.5")], &rules).unwrap();
        assert!(result.is_valid);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn test_string_length_violations_are_warnings() {
        let validator = RuleValidator::new().unwrap();
        let mut rule = string_rule("sample_name", false);
        rule.min_length = Some(5);
        let result = validator.validate(&[field("sample_name", "X-1")], &[rule]).unwrap();

        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        // Length warnings do not cost score
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn test_allowed_values() {
        let validator = RuleValidator::new().unwrap();
        let mut rule = string_rule("priority", false);
        rule.allowed_values = Some(vec!["low".to_string(), "high".to_string()]);

        let result = validator.validate(&[field("priority", "extreme")], &[rule.clone()]).unwrap();
        assert!(!result.is_valid);

        let result = validator.validate(&[field("priority", "high")], &[rule]).unwrap();
        assert!(result.is_valid);
    }

    #[test]
    fn test_no_rules_scores_zero() {
        let validator = RuleValidator::new().unwrap();
        let result = validator.validate(&[field("a", "b")], &[]).unwrap();
        assert_eq!(result.score, 0.0);
        assert!(result.is_valid);
    }
}
