//! Explicit input validation for caller-supplied shapes.
//!
//! Every rule lives here as plain code rather than field attributes, and
//! runs before any store interaction. A failed run reports all violations
//! at once, one per field.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::book::BookPayload;

/// A single field-level rule failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Aggregate of every violation found in one pass over an input shape.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}", self.join())]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    fn join(&self) -> String {
        self.violations
            .iter()
            .map(FieldViolation::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

const MAX_TITLE: usize = 200;
const MAX_AUTHOR: usize = 100;
const MAX_ISBN: usize = 13;
const MAX_PUBLISHER: usize = 100;
const MAX_GENRE: usize = 50;
const MAX_DESCRIPTION: usize = 2000;
const MAX_COVER_URL: usize = 500;

impl BookPayload {
    /// Check every field rule, collecting all violations.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Vec::new();

        if self.title.trim().is_empty() {
            violations.push(FieldViolation {
                field: "title",
                message: "title is required".to_string(),
            });
        } else if self.title.chars().count() > MAX_TITLE {
            violations.push(too_long("title", MAX_TITLE));
        }

        check_len(&mut violations, "author", self.author.as_deref(), MAX_AUTHOR);
        check_len(&mut violations, "isbn", self.isbn.as_deref(), MAX_ISBN);
        check_len(
            &mut violations,
            "publisher",
            self.publisher.as_deref(),
            MAX_PUBLISHER,
        );
        check_len(&mut violations, "genre", self.genre.as_deref(), MAX_GENRE);
        check_len(
            &mut violations,
            "description",
            self.description.as_deref(),
            MAX_DESCRIPTION,
        );
        check_len(
            &mut violations,
            "coverImageUrl",
            self.cover_image_url.as_deref(),
            MAX_COVER_URL,
        );

        if let Some(pages) = self.page_count
            && pages < 1
        {
            violations.push(FieldViolation {
                field: "pageCount",
                message: "page count must be a positive integer".to_string(),
            });
        }

        if let Some(rating) = self.rating
            && (rating < Decimal::ZERO || rating > Decimal::from(5))
        {
            violations.push(FieldViolation {
                field: "rating",
                message: "rating must be between 0 and 5".to_string(),
            });
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }
}

fn check_len(
    violations: &mut Vec<FieldViolation>,
    field: &'static str,
    value: Option<&str>,
    max: usize,
) {
    if let Some(value) = value
        && value.chars().count() > max
    {
        violations.push(too_long(field, max));
    }
}

fn too_long(field: &'static str, max: usize) -> FieldViolation {
    FieldViolation {
        field,
        message: format!("must be at most {} characters", max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(title: &str) -> BookPayload {
        BookPayload {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn minimal_payload_is_valid() {
        assert!(payload("Dune").validate().is_ok());
    }

    #[test]
    fn empty_title_is_rejected() {
        let err = payload("   ").validate().unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].field, "title");
    }

    #[test]
    fn overlong_title_is_rejected() {
        let err = payload(&"x".repeat(201)).validate().unwrap_err();
        assert_eq!(err.violations[0].field, "title");
    }

    #[test]
    fn title_at_limit_is_accepted() {
        assert!(payload(&"x".repeat(200)).validate().is_ok());
    }

    #[test]
    fn nonpositive_page_count_is_rejected() {
        let mut p = payload("Dune");
        p.page_count = Some(0);
        let err = p.validate().unwrap_err();
        assert_eq!(err.violations[0].field, "pageCount");
    }

    #[test]
    fn rating_out_of_range_is_rejected() {
        let mut p = payload("Dune");
        p.rating = Some(Decimal::new(55, 1)); // 5.5
        let err = p.validate().unwrap_err();
        assert_eq!(err.violations[0].field, "rating");

        p.rating = Some(Decimal::new(-1, 0));
        assert!(p.validate().is_err());
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        let mut p = payload("Dune");
        p.rating = Some(Decimal::ZERO);
        assert!(p.validate().is_ok());
        p.rating = Some(Decimal::from(5));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn violations_accumulate_across_fields() {
        let mut p = payload("");
        p.isbn = Some("9".repeat(14));
        p.page_count = Some(-3);
        let err = p.validate().unwrap_err();
        assert_eq!(err.violations.len(), 3);
    }

    #[test]
    fn blank_isbn_counts_as_absent() {
        let mut p = payload("Dune");
        p.isbn = Some("   ".to_string());
        assert_eq!(p.isbn_trimmed(), None);
        p.isbn = Some(" 9780441013593 ".to_string());
        assert_eq!(p.isbn_trimmed(), Some("9780441013593"));
    }
}
