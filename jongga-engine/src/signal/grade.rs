//! Signal grade.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ordinal signal quality, `S > A > B > C`.
///
/// Ordering goes through [`Grade::rank`], never through the variant names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
}

/// Text that is not a grade letter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown grade: {0}")]
pub struct UnknownGrade(pub String);

impl Grade {
    /// All grades, best first.
    pub const ALL: [Grade; 4] = [Grade::S, Grade::A, Grade::B, Grade::C];

    /// Sort rank: 0 for S up to 3 for C.
    pub const fn rank(self) -> u8 {
        match self {
            Self::S => 0,
            Self::A => 1,
            Self::B => 2,
            Self::C => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }

    /// C signals are dropped from the run output.
    pub const fn is_actionable(self) -> bool {
        !matches!(self, Self::C)
    }

    /// Parse a grade, treating anything unrecognised as C.
    pub fn parse_or_lowest(s: &str) -> Self {
        s.parse().unwrap_or(Self::C)
    }
}

impl Ord for Grade {
    fn cmp(&self, other: &Self) -> Ordering {
        other.rank().cmp(&self.rank())
    }
}

impl PartialOrd for Grade {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = UnknownGrade;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" => Ok(Self::S),
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            _ => Err(UnknownGrade(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_follows_rank() {
        assert!(Grade::S > Grade::A);
        assert!(Grade::A > Grade::B);
        assert!(Grade::B > Grade::C);

        let mut grades = vec![Grade::C, Grade::S, Grade::B, Grade::A];
        grades.sort_by_key(|g| g.rank());
        assert_eq!(grades, Grade::ALL.to_vec());
    }

    #[test]
    fn test_parse() {
        assert_eq!("a".parse::<Grade>(), Ok(Grade::A));
        assert_eq!(" S ".parse::<Grade>(), Ok(Grade::S));
        assert!("D".parse::<Grade>().is_err());
        assert_eq!(Grade::parse_or_lowest("SS"), Grade::C);
        assert_eq!(Grade::parse_or_lowest("B"), Grade::B);
    }

    #[test]
    fn test_serde_uses_letter() {
        assert_eq!(serde_json::to_string(&Grade::A).unwrap(), "\"A\"");
        assert_eq!(serde_json::from_str::<Grade>("\"S\"").unwrap(), Grade::S);
        assert!(!Grade::C.is_actionable());
        assert!(Grade::B.is_actionable());
    }
}
