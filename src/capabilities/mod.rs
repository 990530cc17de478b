//! Collaborators the engine calls outward: identifier format, markup
//! sanitizer, clock and receipt issuer.
//!
//! All of them are swappable so a real settlement backend or a different
//! address scheme can be plugged in without touching the state machine.

pub mod mock;
pub mod traits;

use std::sync::Arc;

pub use traits::{
    Clock, IdentifierFormat, MarkupEscaper, RandomReceipts, ReceiptIssuer, Sanitizer,
    StrKeyFormat, SystemClock,
};

/// The set of collaborators one engine instance uses.
#[derive(Clone)]
pub struct Capabilities {
    pub format: Arc<dyn IdentifierFormat>,
    pub sanitizer: Arc<dyn Sanitizer>,
    pub clock: Arc<dyn Clock>,
    pub receipts: Arc<dyn ReceiptIssuer>,
}

impl Capabilities {
    pub fn with_format(mut self, format: Arc<dyn IdentifierFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn Sanitizer>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_receipts(mut self, receipts: Arc<dyn ReceiptIssuer>) -> Self {
        self.receipts = receipts;
        self
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            format: Arc::new(StrKeyFormat),
            sanitizer: Arc::new(MarkupEscaper),
            clock: Arc::new(SystemClock),
            receipts: Arc::new(RandomReceipts),
        }
    }
}
