use serde::Deserialize;
use time::OffsetDateTime;

use crate::error::ApiError;

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CreateDiscount {
    pub percentage: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl CreateDiscount {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !(0..=100).contains(&self.percentage) {
            return Err(ApiError::Validation(
                "Percentage must be between 0 and 100".into(),
            ));
        }
        if self.start_date > self.end_date {
            return Err(ApiError::Validation(
                "Start date must not be after end date".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn discount(percentage: i32, start: OffsetDateTime, end: OffsetDateTime) -> CreateDiscount {
        CreateDiscount {
            percentage,
            start_date: start,
            end_date: end,
            active: true,
        }
    }

    #[test]
    fn percentage_bounds_are_inclusive() {
        let start = datetime!(2024-01-01 00:00 UTC);
        let end = datetime!(2024-12-31 00:00 UTC);
        assert!(discount(0, start, end).validate().is_ok());
        assert!(discount(100, start, end).validate().is_ok());
        assert!(discount(101, start, end).validate().is_err());
        assert!(discount(150, start, end).validate().is_err());
        assert!(discount(-1, start, end).validate().is_err());
    }

    #[test]
    fn start_after_end_is_rejected() {
        let start = datetime!(2024-12-31 00:00 UTC);
        let end = datetime!(2024-01-01 00:00 UTC);
        assert!(discount(25, start, end).validate().is_err());
        // Equal start and end is a valid zero-length window.
        assert!(discount(25, end, end).validate().is_ok());
    }

    #[test]
    fn active_defaults_to_true() {
        let d: CreateDiscount = serde_json::from_str(
            r#"{"percentage":25,"start_date":"2024-01-01T00:00:00Z","end_date":"2024-12-31T00:00:00Z"}"#,
        )
        .expect("deserialize");
        assert!(d.active);
        assert!(d.validate().is_ok());
    }
}
