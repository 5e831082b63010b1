//! Criteria matching for SUMIF and COUNTIF
//!
//! A criteria is one of:
//! - A numeric comparison: `>5`, `>=10`, `<100`, `<=50`
//! - A text comparison: `=foo`, `<>foo`
//! - A bare value, matched for equality: `foo`, `5`
//!
//! Numeric comparisons only match cells holding numbers. Equality and
//! inequality compare the cell's displayed text exactly.

use super::aggregate::numeric_value;
use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::FormulaValue;
use zxcel_core::format_number;

/// Criteria matcher for SUMIF/COUNTIF
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaMatcher {
    criteria_type: CriteriaType,
}

#[derive(Debug, Clone, PartialEq)]
enum CriteriaType {
    /// Numeric comparison (operator, value)
    Comparison(ComparisonOp, f64),
    /// Displayed text equals
    Equal(String),
    /// Displayed text differs
    NotEqual(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ComparisonOp {
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

impl CriteriaMatcher {
    /// Create a new criteria matcher from an evaluated argument
    pub fn new(criteria: &FormulaValue) -> FormulaResult<Self> {
        let criteria_type = match criteria {
            FormulaValue::String(s) => Self::parse_string_criteria(s)?,
            FormulaValue::Number(n) => CriteriaType::Equal(format_number(*n)),
            FormulaValue::Boolean(_) | FormulaValue::Empty => {
                CriteriaType::Equal(criteria.as_string())
            }
            // A criteria given as a single-cell reference uses that cell's value
            FormulaValue::Array(rows) => match rows.as_slice() {
                [row] if row.len() == 1 => return Self::new(&row[0]),
                _ => {
                    return Err(FormulaError::Argument(
                        "criteria must be a single value".into(),
                    ))
                }
            },
            FormulaValue::Error(e) => {
                return Err(FormulaError::Argument(format!(
                    "criteria is an error ({})",
                    e.kind()
                )))
            }
        };

        Ok(Self { criteria_type })
    }

    /// Parse criteria text such as `>=10` or `<>done`
    pub fn parse(s: &str) -> FormulaResult<Self> {
        Ok(Self {
            criteria_type: Self::parse_string_criteria(s)?,
        })
    }

    fn parse_string_criteria(s: &str) -> FormulaResult<CriteriaType> {
        let s = s.trim();

        // Check longer operators first
        let numeric = if let Some(rest) = s.strip_prefix(">=") {
            Some((ComparisonOp::GreaterEqual, rest))
        } else if let Some(rest) = s.strip_prefix("<=") {
            Some((ComparisonOp::LessEqual, rest))
        } else if let Some(rest) = s.strip_prefix("<>") {
            return Ok(CriteriaType::NotEqual(rest.to_string()));
        } else if let Some(rest) = s.strip_prefix('>') {
            Some((ComparisonOp::GreaterThan, rest))
        } else if let Some(rest) = s.strip_prefix('<') {
            Some((ComparisonOp::LessThan, rest))
        } else if let Some(rest) = s.strip_prefix('=') {
            return Ok(CriteriaType::Equal(rest.to_string()));
        } else {
            None
        };

        match numeric {
            Some((op, rest)) => {
                let n = rest
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .ok_or_else(|| {
                        FormulaError::Argument(format!(
                            "criteria '{}' compares against a non-number",
                            s
                        ))
                    })?;
                Ok(CriteriaType::Comparison(op, n))
            }
            None => Ok(CriteriaType::Equal(s.to_string())),
        }
    }

    /// Check if a value matches the criteria
    pub fn matches(&self, value: &FormulaValue) -> bool {
        match &self.criteria_type {
            CriteriaType::Comparison(op, criteria_num) => {
                let Some(n) = numeric_value(value) else {
                    return false;
                };
                match op {
                    ComparisonOp::LessThan => n < *criteria_num,
                    ComparisonOp::LessEqual => n <= *criteria_num,
                    ComparisonOp::GreaterThan => n > *criteria_num,
                    ComparisonOp::GreaterEqual => n >= *criteria_num,
                }
            }
            CriteriaType::Equal(text) => value.as_string() == *text,
            CriteriaType::NotEqual(text) => value.as_string() != *text,
        }
    }
}
