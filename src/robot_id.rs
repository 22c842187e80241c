use std::fmt;

use crate::constants::{ROBOT_ID_MAX, ROBOT_ID_MIN};
use crate::error::{JigError, JigResult};

/// 4-character identifier used to address a robot over the radio link and,
/// on main-boards, burned into EEPROM during programming.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RobotId(String);

impl RobotId {
    /// Accept operator input. Anything other than exactly 4 characters is
    /// rejected.
    pub fn parse(text: &str) -> JigResult<Self> {
        let text = text.trim();
        if text.chars().count() != 4 {
            return Err(JigError::Validation(format!(
                "Robot id must be exactly 4 characters, got {:?}",
                text
            )));
        }
        Ok(RobotId(text.to_uppercase()))
    }

    /// Fresh random serial id in [1000, 9999].
    pub fn generate() -> Self {
        let span = (ROBOT_ID_MAX - ROBOT_ID_MIN + 1) as u128;
        let roll = uuid::Uuid::new_v4().as_u128() % span;
        Self::from_number(ROBOT_ID_MIN + roll as u16)
    }

    pub(crate) fn from_number(n: u16) -> Self {
        RobotId(format!("{:04}", n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for RobotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_four_digits_in_range() {
        for _ in 0..2000 {
            let id = RobotId::generate();
            assert_eq!(id.as_str().len(), 4);
            let n: u16 = id.as_str().parse().unwrap();
            assert!((1000..=9999).contains(&n), "{} out of range", n);
        }
    }

    #[test]
    fn lower_bound_is_zero_padded_width() {
        assert_eq!(RobotId::from_number(1000).as_str(), "1000");
        assert_eq!(RobotId::from_number(42).as_str(), "0042");
    }

    #[test]
    fn parse_requires_exactly_four_characters() {
        assert_eq!(RobotId::parse("zrg6").unwrap().as_str(), "ZRG6");
        assert!(RobotId::parse("abc").is_err());
        assert!(RobotId::parse("abcde").is_err());
        assert!(RobotId::parse("").is_err());
    }
}
