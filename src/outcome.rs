use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

/// Stored code for a won round.
pub const WIN_CODE: i64 = 1;
/// Stored code for a lost round.
pub const LOSE_CODE: i64 = -1;
/// Stored code for a player who neither won nor lost.
pub const UNCHANGED_CODE: i64 = 0;

/// Result of a single player in a single round.
///
/// Records persist the numeric code. Decoding is lenient: the code names are
/// accepted as well, and anything unrecognised becomes [`Outcome::Unchanged`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(from = "OutcomeCode", into = "i64")]
pub enum Outcome {
    Win,
    Lose,
    #[default]
    Unchanged,
}

impl Outcome {
    #[inline]
    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Win)
    }

    #[inline]
    pub fn is_lose(&self) -> bool {
        matches!(self, Outcome::Lose)
    }

    /// Won or lost; unchanged players did not take part in the round's settlement.
    #[inline]
    pub fn is_decided(&self) -> bool {
        !matches!(self, Outcome::Unchanged)
    }

    pub fn code(&self) -> i64 {
        match self {
            Outcome::Win => WIN_CODE,
            Outcome::Lose => LOSE_CODE,
            Outcome::Unchanged => UNCHANGED_CODE,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            WIN_CODE => Some(Outcome::Win),
            LOSE_CODE => Some(Outcome::Lose),
            UNCHANGED_CODE => Some(Outcome::Unchanged),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "win" => Some(Outcome::Win),
            "lose" => Some(Outcome::Lose),
            "unchanged" => Some(Outcome::Unchanged),
            _ => None,
        }
    }
}

impl From<Outcome> for i64 {
    fn from(outcome: Outcome) -> Self {
        outcome.code()
    }
}

/// Any shape an outcome may arrive in from the backend.
#[derive(Deserialize)]
#[serde(untagged)]
enum OutcomeCode {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl From<OutcomeCode> for Outcome {
    fn from(raw: OutcomeCode) -> Self {
        let decoded = match &raw {
            OutcomeCode::Integer(code) => Outcome::from_code(*code),
            OutcomeCode::Float(value) if value.fract() == 0.0 => Outcome::from_code(*value as i64),
            OutcomeCode::Float(_) => None,
            OutcomeCode::Text(text) => Outcome::from_name(text)
                .or_else(|| text.trim().parse::<i64>().ok().and_then(Outcome::from_code)),
            OutcomeCode::Other(_) => None,
        };
        decoded.unwrap_or_else(|| {
            match raw {
                OutcomeCode::Integer(code) => {
                    tracing::warn!(code, "unknown outcome code, treating as unchanged")
                }
                OutcomeCode::Float(code) => {
                    tracing::warn!(code, "unknown outcome code, treating as unchanged")
                }
                OutcomeCode::Text(text) => {
                    tracing::warn!(%text, "unknown outcome name, treating as unchanged")
                }
                OutcomeCode::Other(_) => {
                    tracing::warn!("non-scalar outcome, treating as unchanged")
                }
            }
            Outcome::Unchanged
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Outcome {
        serde_json::from_str(json).expect("outcome always decodes")
    }

    #[test]
    fn decodes_numeric_codes() {
        assert_eq!(decode("1"), Outcome::Win);
        assert_eq!(decode("-1"), Outcome::Lose);
        assert_eq!(decode("0"), Outcome::Unchanged);
        assert_eq!(decode("-1.0"), Outcome::Lose);
    }

    #[test]
    fn decodes_names_case_insensitively() {
        assert_eq!(decode("\"WIN\""), Outcome::Win);
        assert_eq!(decode("\"lose\""), Outcome::Lose);
        assert_eq!(decode("\"1\""), Outcome::Win);
    }

    #[test]
    fn unknown_codes_are_unchanged() {
        assert_eq!(decode("7"), Outcome::Unchanged);
        assert_eq!(decode("0.5"), Outcome::Unchanged);
        assert_eq!(decode("\"maybe\""), Outcome::Unchanged);
        assert_eq!(decode("null"), Outcome::Unchanged);
        assert_eq!(decode("{\"x\": 1}"), Outcome::Unchanged);
    }

    #[test]
    fn encodes_as_code() {
        assert_eq!(serde_json::to_string(&Outcome::Lose).unwrap(), "-1");
        assert_eq!(serde_json::to_string(&Outcome::Win).unwrap(), "1");
    }
}
