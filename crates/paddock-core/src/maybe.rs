//! # Maybe
//!
//! A two-variant optional value used by the order validation helpers.
//!
//! `Maybe` is deliberately small: it mirrors the combinators the shop's
//! validation pipeline needs (`map`, `bind`, `get_or_else`) and converts
//! freely to and from `Option`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A value that is either present or absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Maybe<T> {
    Some(T),
    Nothing,
}

impl<T> Maybe<T> {
    #[must_use]
    pub fn is_some(&self) -> bool {
        matches!(self, Self::Some(_))
    }

    #[must_use]
    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }

    /// Transform the value, if present.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Maybe<U> {
        match self {
            Self::Some(value) => Maybe::Some(f(value)),
            Self::Nothing => Maybe::Nothing,
        }
    }

    /// Chain a computation that may itself produce nothing.
    pub fn bind<U, F: FnOnce(T) -> Maybe<U>>(self, f: F) -> Maybe<U> {
        match self {
            Self::Some(value) => f(value),
            Self::Nothing => Maybe::Nothing,
        }
    }

    /// The value, or `default` when absent.
    pub fn get_or_else(self, default: T) -> T {
        match self {
            Self::Some(value) => value,
            Self::Nothing => default,
        }
    }

    /// Borrow the contents.
    pub fn as_ref(&self) -> Maybe<&T> {
        match self {
            Self::Some(value) => Maybe::Some(value),
            Self::Nothing => Maybe::Nothing,
        }
    }

    /// Convert into a standard `Option`.
    pub fn into_option(self) -> Option<T> {
        self.into()
    }
}

impl<T> Default for Maybe<T> {
    fn default() -> Self {
        Self::Nothing
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Some(v),
            None => Self::Nothing,
        }
    }
}

impl<T> From<Maybe<T>> for Option<T> {
    fn from(value: Maybe<T>) -> Self {
        match value {
            Maybe::Some(v) => Some(v),
            Maybe::Nothing => None,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Maybe<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Some(value) => write!(f, "Some({})", value),
            Self::Nothing => f.write_str("Nothing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half(x: i32) -> Maybe<i32> {
        if x % 2 == 0 {
            Maybe::Some(x / 2)
        } else {
            Maybe::Nothing
        }
    }

    #[test]
    fn some_holds_value() {
        let m = Maybe::Some(10);
        assert!(m.is_some());
        assert!(!m.is_nothing());
        assert_eq!(m.get_or_else(0), 10);
    }

    #[test]
    fn nothing_falls_back() {
        let m: Maybe<i32> = Maybe::Nothing;
        assert!(m.is_nothing());
        assert_eq!(m.get_or_else(0), 0);
    }

    #[test]
    fn map_skips_nothing() {
        assert_eq!(Maybe::Some(5).map(|x| x * 2).get_or_else(0), 10);
        assert!(Maybe::<i32>::Nothing.map(|x| x * 2).is_nothing());
    }

    #[test]
    fn bind_chains() {
        assert_eq!(Maybe::Some(10).bind(half).get_or_else(0), 5);
        assert!(Maybe::Some(5).bind(half).is_nothing());
        assert!(Maybe::Nothing.bind(half).is_nothing());
    }

    #[test]
    fn option_round_trip_and_display() {
        assert_eq!(Maybe::from(Some(3)).into_option(), Some(3));
        assert_eq!(Maybe::Some(3).to_string(), "Some(3)");
        assert_eq!(Maybe::<i32>::Nothing.to_string(), "Nothing");
    }
}
