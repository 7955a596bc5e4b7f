use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// A recorded consent decision. "Not yet asked" is `Option::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentState {
    Accepted,
    Rejected,
}

impl ConsentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentState::Accepted => "accepted",
            ConsentState::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ConsentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsentState {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accepted" => Ok(ConsentState::Accepted),
            "rejected" => Ok(ConsentState::Rejected),
            other => Err(CacheError::InvalidRequest(format!(
                "permission must be 'accepted' or 'rejected', got '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        for state in [ConsentState::Accepted, ConsentState::Rejected] {
            assert_eq!(state.to_string().parse::<ConsentState>().unwrap(), state);
        }
    }

    #[test]
    fn test_parse_is_exact() {
        assert!("Accepted".parse::<ConsentState>().is_err());
        assert!("".parse::<ConsentState>().is_err());
        assert!("yes".parse::<ConsentState>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&ConsentState::Rejected).unwrap(),
            r#""rejected""#
        );
        let parsed: ConsentState = serde_json::from_str(r#""accepted""#).unwrap();
        assert_eq!(parsed, ConsentState::Accepted);
    }
}
