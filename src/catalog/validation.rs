/// Entity validators
///
/// Pure, hand-written rule sets applied to write payloads before anything
/// touches the database. Foreign key *presence* is checked here; whether the
/// referenced rows exist is the handler's job.

use super::types::{BrandInput, CategoryInput, ProductInput};
use std::fmt;
use thiserror::Error;

pub const MIN_NAME_LEN: usize = 2;
pub const MAX_NAME_LEN: usize = 100;

/// One violated rule on one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Every rule a payload violated, in field order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join(.violations))]
pub struct ValidationErrors {
    pub violations: Vec<Violation>,
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Accumulates violations across the rules of one payload
#[derive(Debug, Default)]
struct Rules {
    violations: Vec<Violation>,
}

impl Rules {
    fn fail(&mut self, field: &'static str, message: impl Into<String>) {
        self.violations.push(Violation {
            field,
            message: message.into(),
        });
    }

    fn name(&mut self, field: &'static str, value: &str) {
        let len = value.chars().count();
        if len == 0 {
            self.fail(field, "is required");
        } else if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
            self.fail(
                field,
                format!("must be between {} and {} characters", MIN_NAME_LEN, MAX_NAME_LEN),
            );
        }
    }

    fn required(&mut self, field: &'static str, value: &str) {
        if value.is_empty() {
            self.fail(field, "is required");
        }
    }

    fn url(&mut self, field: &'static str, value: &str) {
        if value.is_empty() {
            self.fail(field, "is required");
        } else if !is_well_formed_url(value) {
            self.fail(field, "must be a valid URL");
        }
    }

    fn positive(&mut self, field: &'static str, value: f64) {
        if !value.is_finite() || value <= 0.0 {
            self.fail(field, "must be greater than 0");
        }
    }

    fn reference(&mut self, field: &'static str, id: i64) {
        if id <= 0 {
            self.fail(field, "is required");
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                violations: self.violations,
            })
        }
    }
}

/// Absolute URL with a host (`https://x.test/a.png`, not `a.png` or `mailto:x`)
pub fn is_well_formed_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|parsed| parsed.has_host())
        .unwrap_or(false)
}

pub fn validate_brand(input: &BrandInput) -> Result<(), ValidationErrors> {
    let mut rules = Rules::default();
    rules.name("name", &input.name);
    rules.url("cover_image", &input.cover_image);
    rules.finish()
}

pub fn validate_category(input: &CategoryInput) -> Result<(), ValidationErrors> {
    let mut rules = Rules::default();
    rules.name("title", &input.title);
    rules.url("cover_image", &input.cover_image);
    rules.finish()
}

pub fn validate_product(input: &ProductInput) -> Result<(), ValidationErrors> {
    let mut rules = Rules::default();
    rules.name("name", &input.name);
    rules.required("description", &input.description);
    rules.positive("price", input.price);
    rules.url("cover_image", &input.cover_image);
    rules.reference("category_id", input.category_id);
    rules.reference("brand_id", input.brand_id);
    rules.finish()
}
