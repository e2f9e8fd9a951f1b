use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LotIdError {
    #[error(
        "Invalid lot number: '{0}' \
         (expected three digits and an optional letter, e.g. 101 or 105A)"
    )]
    Invalid(String),
    #[error("Lot {0} is listed both as skipped and as extra")]
    Conflicting(LotId),
}

/// A lot number as printed on an auction tag: three digits plus an optional
/// sub-lot letter, always stored upper-case.
///
/// Ordering is plain string ordering. Because the digit part is fixed-width
/// this sorts `101 < 101A < 102`, which is what the detected-lots listing wants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LotId(String);

impl LotId {
    pub fn parse(token: &str) -> Result<Self, LotIdError> {
        let normalized = token.trim().to_ascii_uppercase();
        let bytes = normalized.as_bytes();
        let valid = match bytes.len() {
            3 => bytes.iter().all(u8::is_ascii_digit),
            4 => bytes[..3].iter().all(u8::is_ascii_digit) && bytes[3].is_ascii_uppercase(),
            _ => false,
        };
        if valid {
            Ok(LotId(normalized))
        } else {
            Err(LotIdError::Invalid(token.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for LotId {
    type Err = LotIdError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LotId::parse(s)
    }
}

impl TryFrom<String> for LotId {
    type Error = LotIdError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        LotId::parse(&s)
    }
}

impl From<LotId> for String {
    fn from(id: LotId) -> Self {
        id.0
    }
}

/// Parse a user-typed list such as `"113, 116"` or `"105a,110B"`.
/// Whitespace anywhere is ignored, empty tokens are dropped and repeats collapse.
pub fn parse_lot_list(input: &str) -> Result<Vec<LotId>, LotIdError> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let mut seen = HashSet::new();
    let mut lots = Vec::new();
    for token in compact.split(',').filter(|t| !t.is_empty()) {
        let id = LotId::parse(token)?;
        if seen.insert(id.clone()) {
            lots.push(id);
        }
    }
    Ok(lots)
}

/// Lots the user asked to skip, and lots to insert even though no tag
/// photo exists for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LotSelection {
    skip: HashSet<LotId>,
    extra: Vec<LotId>,
}

impl LotSelection {
    pub fn new(skip: Vec<LotId>, extra: Vec<LotId>) -> Result<Self, LotIdError> {
        let skip: HashSet<LotId> = skip.into_iter().collect();
        if let Some(both) = extra.iter().find(|id| skip.contains(*id)) {
            return Err(LotIdError::Conflicting(both.clone()));
        }
        Ok(Self { skip, extra })
    }

    /// Build a selection straight from the two comma-separated form fields.
    pub fn from_lists(skip: &str, extra: &str) -> Result<Self, LotIdError> {
        Self::new(parse_lot_list(skip)?, parse_lot_list(extra)?)
    }

    pub fn is_skipped(&self, id: &LotId) -> bool {
        self.skip.contains(id)
    }

    pub fn skip(&self) -> &HashSet<LotId> {
        &self.skip
    }

    pub fn extra(&self) -> &[LotId] {
        &self.extra
    }
}
