use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A postal code identifier, kept as its decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPincode", into = "String")]
pub struct Pincode(String);

/// Pincodes arrive either as JSON numbers or as numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPincode {
    Number(u64),
    Text(String),
}

impl Pincode {
    /// Builds a pincode from text, rejecting anything that is not all digits.
    pub fn new(value: impl Into<String>) -> Result<Self, AppError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AppError::InvalidPincode(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<RawPincode> for Pincode {
    type Error = AppError;

    fn try_from(raw: RawPincode) -> Result<Self, Self::Error> {
        match raw {
            RawPincode::Number(n) => Ok(Self(n.to_string())),
            RawPincode::Text(s) => Self::new(s),
        }
    }
}

impl TryFrom<&str> for Pincode {
    type Error = AppError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<u32> for Pincode {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

impl From<Pincode> for String {
    fn from(value: Pincode) -> Self {
        value.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An ordered collection of pincodes to query.
///
/// A single pincode converts into a one-element collection, so callers can
/// pass either a scalar or a list wherever `impl Into<Pincodes>` is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawPincodes")]
pub struct Pincodes(Vec<Pincode>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPincodes {
    Many(Vec<Pincode>),
    One(Pincode),
}

impl From<RawPincodes> for Pincodes {
    fn from(raw: RawPincodes) -> Self {
        match raw {
            RawPincodes::Many(list) => Self(list),
            RawPincodes::One(single) => Self(vec![single]),
        }
    }
}

impl Pincodes {
    /// Parses a JSON list (or a single JSON scalar) of pincodes.
    ///
    /// An empty list is rejected: there is nothing to query.
    pub fn from_json(input: &str) -> Result<Self, AppError> {
        let pincodes: Pincodes = serde_json::from_str(input)?;
        if pincodes.is_empty() {
            return Err(AppError::NoPincodes);
        }
        Ok(pincodes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pincode> {
        self.0.iter()
    }
}

impl IntoIterator for Pincodes {
    type Item = Pincode;
    type IntoIter = std::vec::IntoIter<Pincode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<Pincode> for Pincodes {
    fn from(value: Pincode) -> Self {
        Self(vec![value])
    }
}

impl From<u32> for Pincodes {
    fn from(value: u32) -> Self {
        Self(vec![Pincode::from(value)])
    }
}

impl From<Vec<Pincode>> for Pincodes {
    fn from(value: Vec<Pincode>) -> Self {
        Self(value)
    }
}

impl From<Vec<u32>> for Pincodes {
    fn from(value: Vec<u32>) -> Self {
        Self(value.into_iter().map(Pincode::from).collect())
    }
}

impl From<&[u32]> for Pincodes {
    fn from(value: &[u32]) -> Self {
        Self(value.iter().copied().map(Pincode::from).collect())
    }
}

impl<const N: usize> From<[u32; N]> for Pincodes {
    fn from(value: [u32; N]) -> Self {
        Self(value.into_iter().map(Pincode::from).collect())
    }
}
