//! The engine: one membership registry, one proposal ledger, one set of
//! collaborators.
//!
//! `Multisig` is a plain value. Share it across tasks with `Arc`; every
//! method takes `&self`.

use std::sync::Arc;

use tracing::{info, warn};

use crate::capabilities::Capabilities;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{LedgerSummary, Proposal, ProposalFilter, ProposalIter, ProposalLedger};
use crate::registry::{MemberSet, MembershipRegistry};
use crate::store::{LedgerSnapshot, SNAPSHOT_VERSION};
use crate::types::{MemberId, ProposalId};

pub struct Multisig {
    registry: Arc<MembershipRegistry>,
    ledger: ProposalLedger,
    caps: Capabilities,
}

impl Multisig {
    /// Unconfigured engine with the production collaborators.
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::default())
    }

    pub fn with_capabilities(caps: Capabilities) -> Self {
        let registry = Arc::new(MembershipRegistry::new());
        let ledger = ProposalLedger::new(registry.clone(), caps.clone());
        Self {
            registry,
            ledger,
            caps,
        }
    }

    /// Rebuild an engine from a saved snapshot.
    pub fn from_snapshot(snapshot: LedgerSnapshot, caps: Capabilities) -> LedgerResult<Self> {
        let multisig = Self::with_capabilities(caps);
        multisig.restore(snapshot)?;
        Ok(multisig)
    }

    // ---- membership -------------------------------------------------------

    /// Set the members and approval threshold.
    ///
    /// Replaces an earlier configuration only while no proposal exists;
    /// afterwards fails with `AlreadyConfigured`.
    pub fn configure(&self, members: Vec<MemberId>, threshold: u32) -> LedgerResult<Arc<MemberSet>> {
        // Holding the map lock keeps the ledger empty until the new
        // membership is installed.
        let ledger = self.ledger.lock_map();
        if !ledger.is_empty() {
            warn!("configure rejected: proposals exist");
            return Err(LedgerError::AlreadyConfigured);
        }

        let set = self
            .registry
            .configure(members, threshold, self.caps.format.as_ref())?;
        drop(ledger);

        info!(
            members = set.size(),
            threshold = set.quorum_size(),
            "multisig configured"
        );
        Ok(set)
    }

    pub fn members(&self) -> LedgerResult<Arc<MemberSet>> {
        self.registry.current()
    }

    pub fn is_configured(&self) -> bool {
        self.registry.is_configured()
    }

    pub fn is_member(&self, id: &MemberId) -> LedgerResult<bool> {
        self.registry.is_member(id)
    }

    pub fn quorum_size(&self) -> LedgerResult<u32> {
        self.registry.quorum_size()
    }

    pub fn size(&self) -> LedgerResult<usize> {
        self.registry.size()
    }

    // ---- proposals --------------------------------------------------------

    /// See [`ProposalLedger::create_proposal`].
    pub fn create_proposal(
        &self,
        caller: &MemberId,
        recipient: &str,
        asset: &str,
        amount: &str,
        description: &str,
    ) -> LedgerResult<Proposal> {
        self.ledger
            .create_proposal(caller, recipient, asset, amount, description)
    }

    pub fn approve(&self, caller: &MemberId, id: ProposalId) -> LedgerResult<Proposal> {
        self.ledger.approve(caller, id)
    }

    pub fn execute(&self, caller: &MemberId, id: ProposalId) -> LedgerResult<Proposal> {
        self.ledger.execute(caller, id)
    }

    pub fn get(&self, id: ProposalId) -> LedgerResult<Proposal> {
        self.ledger.get(id)
    }

    pub fn list(&self, filter: ProposalFilter) -> ProposalIter {
        self.ledger.list(filter)
    }

    pub fn summary(&self) -> LedgerResult<LedgerSummary> {
        self.ledger.summary()
    }

    // ---- persistence ------------------------------------------------------

    /// Copy of the full state, for a [`crate::store::StateStore`].
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            version: SNAPSHOT_VERSION,
            members: self.registry.current().ok().map(|set| (*set).clone()),
            proposals: self.ledger.copy_all(),
        }
    }

    /// Replace the whole state with `snapshot` after validating it.
    ///
    /// On error nothing changes.
    pub fn restore(&self, snapshot: LedgerSnapshot) -> LedgerResult<()> {
        if let Err(e) = snapshot.validate(self.caps.format.as_ref()) {
            warn!(error = %e, "snapshot rejected");
            return Err(e);
        }

        let proposals = snapshot.proposals.len();
        let mut ledger = self.ledger.lock_map();
        self.registry.install(snapshot.members.map(Arc::new));
        ledger.replace(snapshot.proposals);
        drop(ledger);

        info!(proposals, "state restored");
        Ok(())
    }
}

impl Default for Multisig {
    fn default() -> Self {
        Self::new()
    }
}
