use serde::{Deserialize, Serialize};

/// Standard full-time working year: 52 weeks x 5 days x 8 hours.
pub const FULL_TIME_HOURS: i64 = 2_080;

/// Hard ceiling: 52 weeks x 5 days x 12 hours.
pub const MAX_WFH_HOURS: i64 = 3_120;

/// Outcome of checking a WFH hours figure. Invalid input is reported here,
/// not raised, so the caller can show it inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HoursValidation {
    fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    fn advisory(message: String) -> Self {
        Self {
            valid: true,
            message: Some(message),
        }
    }

    fn rejected(message: String) -> Self {
        Self {
            valid: false,
            message: Some(message),
        }
    }
}

pub fn validate_wfh_hours(hours: i64) -> HoursValidation {
    if hours < 0 {
        return HoursValidation::rejected("WFH hours cannot be negative".into());
    }
    if hours > MAX_WFH_HOURS {
        return HoursValidation::rejected(format!(
            "WFH hours of {hours} exceed the maximum of {MAX_WFH_HOURS} \
             (52 weeks x 5 days x 12 hours)"
        ));
    }
    if hours > FULL_TIME_HOURS {
        return HoursValidation::advisory(format!(
            "WFH hours of {hours} exceed a standard full-time year of {FULL_TIME_HOURS}; \
             make sure your timesheet or diary supports the claim"
        ));
    }
    HoursValidation::ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_hours_rejected() {
        let v = validate_wfh_hours(-1);
        assert!(!v.valid);
        assert!(v.message.unwrap().contains("cannot be negative"));
    }

    #[test]
    fn test_hours_above_ceiling_rejected() {
        assert!(!validate_wfh_hours(3_121).valid);
        assert!(validate_wfh_hours(3_120).valid);
    }

    #[test]
    fn test_hours_above_full_time_warn() {
        let v = validate_wfh_hours(2_081);
        assert!(v.valid);
        assert!(!v.message.unwrap_or_default().is_empty());

        let at_full_time = validate_wfh_hours(2_080);
        assert!(at_full_time.valid);
        assert_eq!(at_full_time.message, None);
    }

    #[test]
    fn test_ordinary_hours_pass_silently() {
        assert_eq!(
            validate_wfh_hours(1_000),
            HoursValidation {
                valid: true,
                message: None
            }
        );
        assert_eq!(validate_wfh_hours(0).message, None);
    }

    #[test]
    fn test_message_omitted_from_json_when_absent() {
        let json = serde_json::to_string(&validate_wfh_hours(10)).unwrap();
        assert_eq!(json, r#"{"valid":true}"#);
    }
}
