//! Free-text input validation
//!
//! Pure helpers the step handlers run on user text before anything
//! touches the store. Error variants double as the retry prompts, so
//! each failure mode reads as its own message.

use thiserror::Error;

/// Trimmed, non-empty name, or `None` for blank input.
pub fn clean_name(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Image-URL steps accept "skip" (any casing) to mean no image.
pub fn optional_image(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("skip") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FloatInputError {
    #[error("That doesn't look like a number. Send a value like 0.15.")]
    NotANumber,
    #[error("The value must be between 0 and 1.")]
    OutOfRange,
    #[error("Float max must be greater than float min.")]
    MaxNotAboveMin,
}

/// One float bound: a decimal-point number inside [0, 1]. Comma
/// decimals are rejected on purpose, matching the stored format.
pub fn parse_float_bound(input: &str) -> Result<f64, FloatInputError> {
    let value: f64 = input.trim().parse().map_err(|_| FloatInputError::NotANumber)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(FloatInputError::OutOfRange);
    }
    Ok(value)
}

/// The max bound additionally has to exceed the already-accepted min.
pub fn parse_float_max(input: &str, float_min: f64) -> Result<f64, FloatInputError> {
    let value = parse_float_bound(input)?;
    if value <= float_min {
        return Err(FloatInputError::MaxNotAboveMin);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed() {
        assert_eq!(clean_name("  Recoil Case  "), Some("Recoil Case".to_string()));
        assert_eq!(clean_name("   "), None);
        assert_eq!(clean_name(""), None);
    }

    #[test]
    fn skip_token_clears_image() {
        assert_eq!(optional_image("skip"), None);
        assert_eq!(optional_image(" SKIP "), None);
        assert_eq!(
            optional_image("https://example.test/x.png"),
            Some("https://example.test/x.png".to_string())
        );
    }

    #[test]
    fn float_bounds() {
        assert_eq!(parse_float_bound("0.15"), Ok(0.15));
        assert_eq!(parse_float_bound(" 1 "), Ok(1.0));
        assert_eq!(parse_float_bound("0,15"), Err(FloatInputError::NotANumber));
        assert_eq!(parse_float_bound("abc"), Err(FloatInputError::NotANumber));
        assert_eq!(parse_float_bound("1.01"), Err(FloatInputError::OutOfRange));
        assert_eq!(parse_float_bound("-0.1"), Err(FloatInputError::OutOfRange));
        assert_eq!(parse_float_bound("NaN"), Err(FloatInputError::OutOfRange));
    }

    #[test]
    fn max_must_exceed_min() {
        assert_eq!(parse_float_max("0.38", 0.15), Ok(0.38));
        assert_eq!(parse_float_max("0.15", 0.15), Err(FloatInputError::MaxNotAboveMin));
        assert_eq!(parse_float_max("0.07", 0.15), Err(FloatInputError::MaxNotAboveMin));
    }

    #[test]
    fn each_failure_reads_distinctly() {
        let prompts = [
            FloatInputError::NotANumber.to_string(),
            FloatInputError::OutOfRange.to_string(),
            FloatInputError::MaxNotAboveMin.to_string(),
        ];
        assert_ne!(prompts[0], prompts[1]);
        assert_ne!(prompts[1], prompts[2]);
        assert_ne!(prompts[0], prompts[2]);
    }
}
