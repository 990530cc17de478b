//! Cosign - m-of-n threshold authorization engine
//!
//! A group of members agrees on a threshold; any member may propose a
//! transfer, members approve it, and once enough have approved any member
//! may execute it, exactly once.
//!
//! Key principles:
//! - One explicit engine instance ([`Multisig`]), no globals
//! - Per-proposal locking: approvals on different proposals run in parallel
//! - Every rejected call leaves state untouched
//! - Settlement, identity and persistence are collaborators, not built in
//!
//! ```
//! use cosign::{MemberId, Multisig, ProposalFilter};
//!
//! let a = MemberId::new(format!("G{}", "A".repeat(55)));
//! let b = MemberId::new(format!("G{}", "B".repeat(55)));
//! let recipient = format!("G{}", "C".repeat(55));
//!
//! let multisig = Multisig::new();
//! multisig.configure(vec![a.clone(), b.clone()], 2).unwrap();
//!
//! let proposal = multisig
//!     .create_proposal(&a, &recipient, "NATIVE", "12.5", "Office rent")
//!     .unwrap();
//! assert_eq!(multisig.list(ProposalFilter::Pending).count(), 1);
//!
//! multisig.approve(&b, proposal.id).unwrap();
//! let executed = multisig.execute(&b, proposal.id).unwrap();
//! assert!(executed.receipt().is_some());
//! ```

pub mod capabilities;
pub mod error;
pub mod ledger;
mod locks;
pub mod multisig;
pub mod registry;
pub mod serialization;
pub mod store;
pub mod types;

pub use capabilities::Capabilities;
pub use error::{LedgerError, LedgerResult};
pub use ledger::{LedgerSummary, Proposal, ProposalFilter, ProposalPhase, ProposalStatus};
pub use multisig::Multisig;
pub use registry::{MemberSet, MembershipRegistry, MAX_MEMBERS};
pub use store::{
    FileStateStore, LedgerSnapshot, MemoryStateStore, StateLock, StateStore, StoreError,
};
pub use types::{Amount, Asset, MemberId, ProposalId, Receipt, Timestamp, NATIVE_ASSET};
