//! Cross-field validation of farm area figures.

use crate::error::DomainError;

/// Validates the farm area constraint over the whole candidate field set.
///
/// When no positive total area is given the constraint is vacuously
/// satisfied. Otherwise both partial areas must be non-negative and their
/// sum must not exceed the total.
pub fn validate_areas(
    total_area: Option<f64>,
    agricultural_area: Option<f64>,
    vegetation_area: Option<f64>,
) -> Result<(), DomainError> {
    let total = total_area.unwrap_or(0.0);
    let agricultural = agricultural_area.unwrap_or(0.0);
    let vegetation = vegetation_area.unwrap_or(0.0);

    if total <= 0.0 {
        return Ok(());
    }

    if agricultural < 0.0 || vegetation < 0.0 {
        return Err(DomainError::NegativeArea);
    }

    let sum = agricultural + vegetation;
    if sum > total {
        return Err(DomainError::AreaSumExceedsTotal { sum, total });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_zero_total_is_vacuously_valid() {
        assert!(validate_areas(None, Some(100.0), Some(100.0)).is_ok());
        assert!(validate_areas(Some(0.0), Some(100.0), Some(100.0)).is_ok());
        assert!(validate_areas(Some(-5.0), Some(100.0), Some(100.0)).is_ok());
    }

    #[test]
    fn sum_below_total_is_valid() {
        assert!(validate_areas(Some(1000.0), Some(600.0), Some(300.0)).is_ok());
        assert!(validate_areas(Some(1000.0), None, None).is_ok());
    }

    #[test]
    fn sum_equal_to_total_is_valid() {
        assert!(validate_areas(Some(1000.0), Some(600.0), Some(400.0)).is_ok());
    }

    #[test]
    fn sum_above_total_is_rejected() {
        let err = validate_areas(Some(1000.0), Some(700.0), Some(400.0)).unwrap_err();
        assert_eq!(
            err,
            DomainError::AreaSumExceedsTotal {
                sum: 1100.0,
                total: 1000.0
            }
        );
        assert!(err.to_string().contains("1100"));
        assert!(err.to_string().contains("1000"));
    }

    #[test]
    fn negative_areas_are_rejected() {
        assert_eq!(
            validate_areas(Some(1000.0), Some(-1.0), Some(0.0)),
            Err(DomainError::NegativeArea)
        );
        assert_eq!(
            validate_areas(Some(1000.0), Some(0.0), Some(-1.0)),
            Err(DomainError::NegativeArea)
        );
    }
}
