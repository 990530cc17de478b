//! Value types shared by the registry and the ledger.
//!
//! Identifiers are plain newtypes: the format contract is enforced by the
//! engine through [`crate::capabilities::IdentifierFormat`], not by the
//! constructors here, so a deployment can swap the format without touching
//! these types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{LedgerError, LedgerResult};

/// Length of member, recipient and asset contract identifiers.
pub const IDENTIFIER_LEN: usize = 56;

/// Maximum number of fractional digits accepted in an [`Amount`].
pub const MAX_AMOUNT_DECIMALS: usize = 18;

/// Sentinel used on the wire and in the CLI for the native asset.
pub const NATIVE_ASSET: &str = "NATIVE";

/// Identifier of a group member (also used for proposal recipients).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display: first 6 and last 4 characters.
    pub fn short(&self) -> String {
        abbreviate(&self.0)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Asset a proposal moves: the native asset or a token contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Asset {
    Native,
    Contract(String),
}

impl Asset {
    /// Interpret user input: the [`NATIVE_ASSET`] sentinel or a contract id.
    ///
    /// The contract id is not validated here.
    pub fn parse(input: &str) -> Self {
        if input == NATIVE_ASSET {
            Asset::Native
        } else {
            Asset::Contract(input.to_string())
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }

    /// Display name: `XLM` for the native asset, abbreviated contract otherwise.
    pub fn label(&self) -> String {
        match self {
            Asset::Native => "XLM".to_string(),
            Asset::Contract(id) => abbreviate(id),
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => f.write_str(NATIVE_ASSET),
            Asset::Contract(id) => f.write_str(id),
        }
    }
}

/// Positive decimal amount, kept as the exact string the proposer typed.
///
/// Validation is syntactic only: no overflow or asset-decimals check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(String);

impl Amount {
    /// Parse `DIGITS [ "." DIGITS ]` with a non-zero value and at most
    /// [`MAX_AMOUNT_DECIMALS`] fractional digits.
    pub fn parse(input: &str) -> LedgerResult<Self> {
        let reject = |reason: &str| LedgerError::InvalidAmount {
            amount: input.to_string(),
            reason: reason.to_string(),
        };

        let (whole, fraction) = match input.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (input, None),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(reject("must be a positive decimal number"));
        }

        if let Some(fraction) = fraction {
            if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return Err(reject("must be a positive decimal number"));
            }
            if fraction.len() > MAX_AMOUNT_DECIMALS {
                return Err(reject("at most 18 decimal places are allowed"));
            }
        }

        let non_zero = input.bytes().any(|b| (b'1'..=b'9').contains(&b));
        if !non_zero {
            return Err(reject("must be greater than zero"));
        }

        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ledger-assigned proposal number, starting at 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProposalId(pub u64);

impl ProposalId {
    pub const FIRST: ProposalId = ProposalId(1);

    /// The id after this one, or `None` once the id space is used up.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Milliseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Last millisecond of year 9999, the end of the RFC 3339 range.
    pub const MAX_RFC3339: Timestamp = Timestamp(253_402_300_799_999);

    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn to_system_time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self > Self::MAX_RFC3339 {
            return write!(f, "{}ms", self.0);
        }
        write!(
            f,
            "{}",
            humantime::format_rfc3339_seconds(self.to_system_time())
        )
    }
}

/// Opaque settlement reference recorded at execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Receipt(String);

impl Receipt {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn abbreviate(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() <= 10 {
        return id.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
