use serde::{Deserialize, Deserializer};

use crate::models::CaseRecord;

/// Parses a raw count cell.
///
/// Empty, unparseable, non-finite and negative values all come back as
/// `None`. Whitespace around the number is ignored.
pub fn clean_count(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}

/// serde adapter so that a bad count cell marks the value missing instead of
/// failing the whole row.
pub(crate) fn lenient_count<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(clean_count))
}

/// Number of case records with at least one missing count.
pub(crate) fn count_incomplete(records: &[CaseRecord]) -> usize {
    records
        .iter()
        .filter(|r| {
            r.total_cases.is_none() || r.total_deaths.is_none() || r.total_recovered.is_none()
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_count_accepts_plain_numbers() {
        assert_eq!(clean_count("100"), Some(100.0));
        assert_eq!(clean_count("12.5"), Some(12.5));
        assert_eq!(clean_count(" 42 "), Some(42.0));
        assert_eq!(clean_count("0"), Some(0.0));
    }

    #[test]
    fn test_clean_count_marks_invalid_values_missing() {
        assert_eq!(clean_count(""), None);
        assert_eq!(clean_count("   "), None);
        assert_eq!(clean_count("n/a"), None);
        assert_eq!(clean_count("NaN"), None);
        assert_eq!(clean_count("inf"), None);
        assert_eq!(clean_count("-3"), None);
    }

    #[test]
    fn test_count_incomplete() {
        let records = vec![
            CaseRecord::new("US", Some(1.0), Some(1.0), Some(1.0)),
            CaseRecord::new("FR", Some(1.0), None, Some(1.0)),
            CaseRecord::new("DE", None, None, None),
        ];
        assert_eq!(count_incomplete(&records), 2);
    }
}
