//! Proposal ledger.
//!
//! - Creator's approval is recorded at creation
//! - `Ready` is derived (open and approvals >= threshold), never stored
//! - Execution is explicit, exactly once, and terminal

pub mod filter;
pub mod lifecycle;
pub mod proposal;

#[cfg(test)]
mod proptests;

pub use filter::{newest_first, LedgerSummary, ProposalFilter, ProposalIter};
pub use lifecycle::ProposalLedger;
pub use proposal::{Proposal, ProposalPhase, ProposalStatus};
