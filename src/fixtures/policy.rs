//! Pricing Policy Fixtures

use std::path::Path;

use rusty_money::Money;
use serde::Deserialize;

use crate::{
    fixtures::{FixtureError, STANDARD_POLICY_YAML, parse_percentage, parse_price, read},
    pricing::PricingPolicy,
};

/// Pricing policy in YAML
#[derive(Debug, Deserialize)]
pub struct PolicyFixture {
    /// Large order tier
    pub large_order: LargeOrderFixture,

    /// Multi-line tier
    pub multi_line: MultiLineFixture,

    /// Preparation time estimate
    pub prep: PrepFixture,
}

/// Large order tier in YAML
#[derive(Debug, Deserialize)]
pub struct LargeOrderFixture {
    /// Threshold in format "500.00 INR"; subtotals strictly above it qualify
    pub threshold: String,

    /// Rate in format "10%" or "0.10"
    pub rate: String,
}

/// Multi-line tier in YAML
#[derive(Debug, Deserialize)]
pub struct MultiLineFixture {
    /// Minimum number of cart lines
    pub min_lines: usize,

    /// Rate in format "5%" or "0.05"
    pub rate: String,
}

/// Preparation time in YAML
#[derive(Debug, Deserialize)]
pub struct PrepFixture {
    /// Minutes for any order
    pub base_minutes: u32,

    /// Minutes per unit ordered
    pub minutes_per_unit: u32,
}

impl PolicyFixture {
    /// Parse a policy from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Yaml`] if the text is not a valid policy document.
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        Ok(serde_norway::from_str(contents)?)
    }
}

impl TryFrom<PolicyFixture> for PricingPolicy {
    type Error = FixtureError;

    fn try_from(fixture: PolicyFixture) -> Result<Self, Self::Error> {
        let (threshold_minor, currency) = parse_price(&fixture.large_order.threshold)?;

        Ok(PricingPolicy {
            large_order_threshold: Money::from_minor(threshold_minor, currency),
            large_order_rate: parse_percentage(&fixture.large_order.rate)?,
            multi_line_min_lines: fixture.multi_line.min_lines,
            multi_line_rate: parse_percentage(&fixture.multi_line.rate)?,
            base_prep_minutes: fixture.prep.base_minutes,
            prep_minutes_per_unit: fixture.prep.minutes_per_unit,
        })
    }
}

/// Load a policy from `path`, or the standard policy when no path is given.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_policy(path: Option<&Path>) -> Result<PricingPolicy, FixtureError> {
    let contents = match path {
        Some(path) => read(path)?,
        None => STANDARD_POLICY_YAML.to_string(),
    };

    PolicyFixture::from_yaml(&contents)?.try_into()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use decimal_percentage::Percentage;
    use rust_decimal::Decimal;
    use rusty_money::iso::{GBP, INR};
    use tempfile::NamedTempFile;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn standard_policy_matches_default() -> TestResult {
        assert_eq!(load_policy(None)?, PricingPolicy::default());

        Ok(())
    }

    #[test]
    fn custom_policy_file_is_applied() -> TestResult {
        let mut file = NamedTempFile::new()?;

        write!(
            file,
            r#"
large_order:
  threshold: "20.00 GBP"
  rate: "15%"
multi_line:
  min_lines: 4
  rate: "0.02"
prep:
  base_minutes: 5
  minutes_per_unit: 3
"#
        )?;

        let policy = load_policy(Some(file.path()))?;

        assert_eq!(policy.currency(), GBP);
        assert_eq!(policy.large_order_threshold, Money::from_minor(2000, GBP));
        assert_eq!(policy.large_order_rate, Percentage::from(Decimal::new(15, 2)));
        assert_eq!(policy.multi_line_min_lines, 4);
        assert_eq!(policy.multi_line_rate, Percentage::from(Decimal::new(2, 2)));
        assert_eq!(policy.base_prep_minutes, 5);
        assert_eq!(policy.prep_minutes_per_unit, 3);

        Ok(())
    }

    #[test]
    fn bad_rate_is_rejected() -> TestResult {
        let yaml = r#"
large_order: { threshold: "500.00 INR", rate: "lots" }
multi_line: { min_lines: 3, rate: "5%" }
prep: { base_minutes: 10, minutes_per_unit: 2 }
"#;

        let result = PricingPolicy::try_from(PolicyFixture::from_yaml(yaml)?);

        assert!(matches!(result, Err(FixtureError::InvalidPercentage(rate)) if rate == "lots"));

        Ok(())
    }

    #[test]
    fn missing_section_is_a_yaml_error() {
        let result = PolicyFixture::from_yaml("large_order: { threshold: \"1 INR\", rate: \"1%\" }");

        assert!(matches!(result, Err(FixtureError::Yaml(_))));
        assert_eq!(PricingPolicy::default().currency(), INR);
    }
}
