use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Controls which elements the differ reports as moved.
///
/// An element present in both snapshots whose position changed is either a
/// move or, when moves are restricted to hinted pairs, an update or no-op.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDetection {
    /// Any index change is a move.
    #[default]
    CheckAll,
    /// Only pairs flagged by the caller's move hint are considered for moves.
    OnlyHinted,
}

impl MoveDetection {
    /// Whether a pair whose index changed should be reported as moved.
    pub fn is_move(self, move_hinted: bool, index_changed: bool) -> bool {
        match self {
            Self::CheckAll => index_changed,
            Self::OnlyHinted => move_hinted && index_changed,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::CheckAll => "check_all",
            Self::OnlyHinted => "only_hinted",
        }
    }
}

impl fmt::Display for MoveDetection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoveDetection {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "check_all" | "check-all" => Ok(Self::CheckAll),
            "only_hinted" | "only-hinted" => Ok(Self::OnlyHinted),
            other => Err(TypeError::UnknownMoveDetection(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_checks_all() {
        assert_eq!(MoveDetection::default(), MoveDetection::CheckAll);
    }

    #[test]
    fn check_all_ignores_hint() {
        assert!(MoveDetection::CheckAll.is_move(false, true));
        assert!(MoveDetection::CheckAll.is_move(true, true));
        assert!(!MoveDetection::CheckAll.is_move(true, false));
    }

    #[test]
    fn only_hinted_requires_hint() {
        assert!(!MoveDetection::OnlyHinted.is_move(false, true));
        assert!(MoveDetection::OnlyHinted.is_move(true, true));
        assert!(!MoveDetection::OnlyHinted.is_move(true, false));
    }

    #[test]
    fn parse_accepts_both_spellings() {
        assert_eq!("check_all".parse(), Ok(MoveDetection::CheckAll));
        assert_eq!("only-hinted".parse(), Ok(MoveDetection::OnlyHinted));
        assert_eq!(
            "sometimes".parse::<MoveDetection>(),
            Err(TypeError::UnknownMoveDetection("sometimes".into()))
        );
    }

    #[test]
    fn display_roundtrips_through_parse() {
        for mode in [MoveDetection::CheckAll, MoveDetection::OnlyHinted] {
            assert_eq!(mode.to_string().parse(), Ok(mode));
        }
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&MoveDetection::OnlyHinted).unwrap();
        assert_eq!(json, "\"only_hinted\"");
        let parsed: MoveDetection = serde_json::from_str("\"check_all\"").unwrap();
        assert_eq!(parsed, MoveDetection::CheckAll);
    }
}
