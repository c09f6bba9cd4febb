//! Conversions between the `shared` wire DTOs and the domain models.
//!
//! Dates travel as ISO 8601 strings (`YYYY-MM-DD`) and timestamps as RFC 3339.
//! A date that does not parse is a validation error of the request.

pub mod animal_mapper;
pub mod breeding_mapper;
pub mod pedigree_mapper;
pub mod sale_mapper;

use chrono::NaiveDate;

use crate::error::{HerdError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        HerdError::validation(format!("{} must be a date formatted YYYY-MM-DD, got {:?}", field, value))
    })
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("birth_date", "2024-03-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
        assert!(matches!(parse_date("birth_date", "15/03/2024"), Err(HerdError::Validation(_))));
        assert!(matches!(parse_date("birth_date", "2024-02-30"), Err(HerdError::Validation(_))));
    }
}
