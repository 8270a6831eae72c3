use serde::{Deserialize, Serialize};
use super::ValidationError;

/// Upper bound of the quarter-count input on the page
pub const MAX_QUARTERS: usize = 12;

/// Raw value of the quarter-count input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuarterCountForm {
    pub count: String,
}

impl QuarterCountForm {
    /// Parses the input and bounds it to `1..=MAX_QUARTERS`
    pub fn validate(&self) -> Result<usize, ValidationError> {
        let count: i64 = self
            .count
            .trim()
            .parse()
            .map_err(|_| ValidationError::new("Number of quarters must be a whole number"))?;
        Ok(count.clamp(1, MAX_QUARTERS as i64) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(value: &str) -> QuarterCountForm {
        QuarterCountForm { count: value.to_string() }
    }

    #[test]
    fn count_is_bounded() {
        assert_eq!(count("3").validate().unwrap(), 3);
        assert_eq!(count("0").validate().unwrap(), 1);
        assert_eq!(count("-2").validate().unwrap(), 1);
        assert_eq!(count("40").validate().unwrap(), MAX_QUARTERS);
    }

    #[test]
    fn non_numeric_count_is_rejected() {
        assert!(count("four").validate().is_err());
        assert!(count("").validate().is_err());
    }
}
