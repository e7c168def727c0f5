//! Variables - Parameters and the named integer store
//!
//! A [`Parameter`] is an operand that is either a literal integer or a name.
//! Names resolve against the [`VariableStore`] on every use, so a command
//! sees the latest value written by CHV.

use crate::error::{ExplorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Command operand
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Parameter {
    /// Optional operand left out
    #[default]
    Absent,
    Literal(i64),
    /// Variable (or, for boxed transforms, pattern) name
    Name(String),
}

impl Parameter {
    /// Tokens starting with `A-Z` are names; anything else must be an integer.
    pub fn parse(token: &str) -> Result<Self> {
        match token.chars().next() {
            Some('A'..='Z') => Ok(Self::Name(token.to_string())),
            Some(_) => token
                .parse::<i64>()
                .map(Self::Literal)
                .map_err(|_| ExplorError::InvalidParameter(token.to_string())),
            None => Err(ExplorError::InvalidParameter(String::new())),
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(n) => Some(n),
            _ => None,
        }
    }
}

impl From<i64> for Parameter {
    fn from(v: i64) -> Self {
        Self::Literal(v)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "-"),
            Self::Literal(v) => write!(f, "{}", v),
            Self::Name(n) => write!(f, "{}", n),
        }
    }
}

/// Named integer registers, created with value 0 on first read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableStore {
    values: HashMap<String, i64>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a parameter; `None` only for an absent operand.
    pub fn resolve(&mut self, param: &Parameter) -> Option<i64> {
        match param {
            Parameter::Absent => None,
            Parameter::Literal(v) => Some(*v),
            Parameter::Name(name) => Some(*self.values.entry(name.clone()).or_insert(0)),
        }
    }

    /// Resolve a parameter that must be present
    pub fn require(&mut self, param: &Parameter, what: &str) -> Result<i64> {
        self.resolve(param)
            .ok_or_else(|| ExplorError::UnresolvedVariable(what.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.values.get(name).copied()
    }

    pub fn set(&mut self, name: &str, value: i64) {
        self.values.insert(name.to_string(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.values.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parameter() {
        assert_eq!(Parameter::parse("X1").unwrap(), Parameter::name("X1"));
        assert_eq!(Parameter::parse("42").unwrap(), Parameter::Literal(42));
        assert_eq!(Parameter::parse("-3").unwrap(), Parameter::Literal(-3));
        assert!(Parameter::parse("x").is_err());
        assert!(Parameter::parse("").is_err());
    }

    #[test]
    fn test_lazy_creation() {
        let mut vars = VariableStore::new();
        assert!(vars.is_empty());
        assert_eq!(vars.resolve(&Parameter::name("COUNT")), Some(0));
        assert_eq!(vars.get("COUNT"), Some(0));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn test_resolve_sees_latest_value() {
        let mut vars = VariableStore::new();
        let p = Parameter::name("N");
        vars.set("N", 5);
        assert_eq!(vars.resolve(&p), Some(5));
        vars.set("N", 9);
        assert_eq!(vars.resolve(&p), Some(9));
    }

    #[test]
    fn test_absent_parameter() {
        let mut vars = VariableStore::new();
        assert_eq!(vars.resolve(&Parameter::Absent), None);
        assert!(matches!(
            vars.require(&Parameter::Absent, "IF lhs"),
            Err(ExplorError::UnresolvedVariable(_))
        ));
        assert_eq!(vars.require(&Parameter::Literal(3), "x").unwrap(), 3);
    }
}
