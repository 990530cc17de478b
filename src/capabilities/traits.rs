//! Trait abstractions for the collaborators the engine calls outward.
//!
//! Production defaults live next to each trait; deterministic doubles for
//! tests are in [`super::mock`].

use rand::RngCore;
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{ProposalId, Receipt, Timestamp, IDENTIFIER_LEN};

/// Source of "now" for creation and execution stamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Issues the settlement reference recorded when a proposal executes.
///
/// Every call must return a fresh value.
pub trait ReceiptIssuer: Send + Sync {
    fn issue(&self, proposal: ProposalId, executed_at: Timestamp) -> Receipt;
}

/// Identifier format checks.
pub trait IdentifierFormat: Send + Sync {
    /// Members and proposal recipients.
    fn is_member_identifier(&self, id: &str) -> bool;

    /// Token contracts (non-native assets).
    fn is_asset_identifier(&self, id: &str) -> bool;
}

/// Neutralizes markup in free text before it is stored.
pub trait Sanitizer: Send + Sync {
    fn sanitize(&self, text: &str) -> String;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Timestamp::from_millis(millis)
    }
}

/// Simulated settlement: SHA-256 over the proposal id, execution time and
/// 32 random bytes, hex encoded (64 characters).
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomReceipts;

impl ReceiptIssuer for RandomReceipts {
    fn issue(&self, proposal: ProposalId, executed_at: Timestamp) -> Receipt {
        let mut nonce = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut nonce);

        let mut hasher = Sha256::new();
        hasher.update(proposal.0.to_be_bytes());
        hasher.update(executed_at.as_millis().to_be_bytes());
        hasher.update(nonce);
        Receipt::new(hex::encode(hasher.finalize()))
    }
}

/// Stellar StrKey shape: 56 characters, a one-letter version prefix, then
/// the base32 alphabet `A-Z2-7`. Members use `G`, contracts use `C`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrKeyFormat;

impl StrKeyFormat {
    fn matches(id: &str, prefix: u8) -> bool {
        let bytes = id.as_bytes();
        bytes.len() == IDENTIFIER_LEN
            && bytes[0] == prefix
            && bytes[1..]
                .iter()
                .all(|b| b.is_ascii_uppercase() || (b'2'..=b'7').contains(b))
    }
}

impl IdentifierFormat for StrKeyFormat {
    fn is_member_identifier(&self, id: &str) -> bool {
        Self::matches(id, b'G')
    }

    fn is_asset_identifier(&self, id: &str) -> bool {
        Self::matches(id, b'C')
    }
}

/// Trims the text and replaces `& < > " '` with HTML entities.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupEscaper;

impl Sanitizer for MarkupEscaper {
    fn sanitize(&self, text: &str) -> String {
        let trimmed = text.trim();
        let mut out = String::with_capacity(trimmed.len());
        for c in trimmed.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                _ => out.push(c),
            }
        }
        out
    }
}
