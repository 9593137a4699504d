//! Fixed time-horizon partitions for notes.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One of the five fixed partitions a note belongs to.
///
/// The set is closed; it is not user-extensible.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[default]
    Today,
    Week,
    Month,
    Semester,
    Year,
}

impl Scope {
    /// All scopes in display order (shortest horizon first).
    pub const ALL: [Scope; 5] = [
        Scope::Today,
        Scope::Week,
        Scope::Month,
        Scope::Semester,
        Scope::Year,
    ];

    /// Stable wire/storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
            Self::Semester => "semester",
            Self::Year => "year",
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input did not name one of the five scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseScopeError(pub String);

impl Display for ParseScopeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown scope `{}`; expected today|week|month|semester|year",
            self.0
        )
    }
}

impl Error for ParseScopeError {}

impl FromStr for Scope {
    type Err = ParseScopeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Scope::ALL
            .into_iter()
            .find(|scope| scope.as_str() == normalized)
            .ok_or(ParseScopeError(normalized))
    }
}

#[cfg(test)]
mod tests {
    use super::Scope;

    #[test]
    fn parses_case_insensitive_and_trimmed_names() {
        assert_eq!(" Week ".parse::<Scope>().unwrap(), Scope::Week);
        assert_eq!("SEMESTER".parse::<Scope>().unwrap(), Scope::Semester);
    }

    #[test]
    fn rejects_unknown_scope() {
        let err = "decade".parse::<Scope>().unwrap_err();
        assert!(err.to_string().contains("decade"));
    }

    #[test]
    fn serializes_as_lowercase_name() {
        let json = serde_json::to_string(&Scope::Semester).unwrap();
        assert_eq!(json, "\"semester\"");
    }
}
