//! Proposal lifecycle: create, approve, execute.
//!
//! Locking:
//! - the proposal map sits behind an `RwLock`; only `create_proposal` (and
//!   configure/restore through the engine) take it for writing
//! - each proposal sits behind its own `Mutex`, held for the whole
//!   check-then-write of `approve` and `execute`
//! - `approve`, `execute` and `get` keep a shared read guard on the map
//!   while they hold a proposal lock, so a restore cannot swap the proposal
//!   out from under them; work on different proposals still runs in parallel
//! - lock order is map, then membership, then proposal
//!
//! Input validation happens before any lock is taken.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock, RwLockWriteGuard};

use tracing::{debug, info};

use super::filter::{LedgerSummary, ProposalFilter, ProposalIter};
use super::proposal::{Proposal, ProposalStatus};
use crate::capabilities::Capabilities;
use crate::error::{LedgerError, LedgerResult};
use crate::locks;
use crate::registry::{MemberSet, MembershipRegistry};
use crate::types::{Amount, Asset, MemberId, ProposalId};

type ProposalMap = BTreeMap<ProposalId, Arc<Mutex<Proposal>>>;

/// Owner of all proposals. Reads membership, never changes it.
pub struct ProposalLedger {
    registry: Arc<MembershipRegistry>,
    caps: Capabilities,
    proposals: RwLock<ProposalMap>,
}

impl ProposalLedger {
    pub fn new(registry: Arc<MembershipRegistry>, caps: Capabilities) -> Self {
        Self {
            registry,
            caps,
            proposals: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a proposal. The creator's approval is recorded immediately.
    pub fn create_proposal(
        &self,
        caller: &MemberId,
        recipient: &str,
        asset: &str,
        amount: &str,
        description: &str,
    ) -> LedgerResult<Proposal> {
        self.authorize(caller)
            .inspect_err(|e| debug!(caller = %caller.short(), error = e.kind(), "create rejected"))?;

        let (recipient, asset, amount, description) = self
            .validate_draft(recipient, asset, amount, description)
            .inspect_err(|e| debug!(caller = %caller.short(), error = e.kind(), "create rejected"))?;
        let created_at = self.caps.clock.now();

        let mut map = locks::write(&self.proposals);

        // Membership may only change while the ledger is empty, and that
        // change happens under this same lock: re-check here.
        self.authorize(caller)?;

        let id = match map.keys().next_back() {
            Some(&last) => last.next().ok_or(LedgerError::IdsExhausted(last))?,
            None => ProposalId::FIRST,
        };

        let proposal = Proposal {
            id,
            recipient,
            asset,
            amount,
            description,
            created_by: caller.clone(),
            created_at,
            status: ProposalStatus::Open {
                approvers: vec![caller.clone()],
            },
        };
        map.insert(id, Arc::new(Mutex::new(proposal.clone())));
        drop(map);

        info!(
            proposal = %id,
            creator = %caller.short(),
            amount = %proposal.amount,
            asset = %proposal.asset.label(),
            "proposal created"
        );
        Ok(proposal)
    }

    /// Record `caller`'s approval. Does not execute, even once quorum is met.
    pub fn approve(&self, caller: &MemberId, id: ProposalId) -> LedgerResult<Proposal> {
        let map = locks::read(&self.proposals);
        let members = self.authorize(caller).inspect_err(|e| {
            debug!(proposal = %id, caller = %caller.short(), error = e.kind(), "approve rejected")
        })?;
        let handle = map.get(&id).ok_or(LedgerError::NotFound(id))?;

        let mut proposal = locks::lock(handle);
        if proposal.is_executed() {
            debug!(proposal = %id, caller = %caller.short(), "approve rejected: already executed");
            return Err(LedgerError::AlreadyExecuted(id));
        }
        if proposal.has_approved(caller) {
            debug!(proposal = %id, caller = %caller.short(), "approve rejected: already approved");
            return Err(LedgerError::AlreadyApproved {
                id,
                member: caller.clone(),
            });
        }
        proposal.push_approver(caller.clone());
        let updated = proposal.clone();
        drop(proposal);
        drop(map);

        info!(
            proposal = %id,
            approver = %caller.short(),
            approvals = updated.approval_count(),
            threshold = members.quorum_size(),
            ready = updated.is_ready(members.quorum_size()),
            "proposal approved"
        );
        Ok(updated)
    }

    /// Execute a proposal whose approvals reach the threshold.
    ///
    /// Exactly one concurrent caller wins; the rest see `AlreadyExecuted`.
    pub fn execute(&self, caller: &MemberId, id: ProposalId) -> LedgerResult<Proposal> {
        let map = locks::read(&self.proposals);
        let members = self.authorize(caller).inspect_err(|e| {
            debug!(proposal = %id, caller = %caller.short(), error = e.kind(), "execute rejected")
        })?;
        let handle = map.get(&id).ok_or(LedgerError::NotFound(id))?;

        let mut proposal = locks::lock(handle);
        if proposal.is_executed() {
            debug!(proposal = %id, caller = %caller.short(), "execute rejected: already executed");
            return Err(LedgerError::AlreadyExecuted(id));
        }
        if !members.is_quorum(proposal.approval_count()) {
            debug!(
                proposal = %id,
                approvals = proposal.approval_count(),
                threshold = members.quorum_size(),
                "execute rejected: quorum not met"
            );
            return Err(LedgerError::QuorumNotMet {
                id,
                approvals: proposal.approval_count(),
                threshold: members.quorum_size(),
            });
        }

        // Clock and receipt issuer are in-memory calls; issuing under the
        // lock guarantees one receipt per proposal.
        let executed_at = self.caps.clock.now();
        let receipt = self.caps.receipts.issue(id, executed_at);
        proposal.mark_executed(executed_at, receipt);
        let updated = proposal.clone();
        drop(proposal);
        drop(map);

        info!(
            proposal = %id,
            executor = %caller.short(),
            receipt = %updated.receipt().map(|r| r.as_str()).unwrap_or_default(),
            "proposal executed"
        );
        Ok(updated)
    }

    pub fn get(&self, id: ProposalId) -> LedgerResult<Proposal> {
        let map = locks::read(&self.proposals);
        let handle = map.get(&id).ok_or(LedgerError::NotFound(id))?;
        let proposal = locks::lock(handle).clone();
        Ok(proposal)
    }

    /// Proposals matching `filter`, newest first.
    ///
    /// Each proposal is copied under its own lock, so no yielded value mixes
    /// fields from before and after a concurrent approve/execute.
    pub fn list(&self, filter: ProposalFilter) -> ProposalIter {
        match self.registry.current() {
            Ok(members) => ProposalIter::new(self.copy_all(), filter, members.quorum_size()),
            // No configuration means no proposals.
            Err(_) => ProposalIter::empty(filter),
        }
    }

    pub fn summary(&self) -> LedgerResult<LedgerSummary> {
        let members = self.registry.current()?;
        let proposals = self.copy_all();
        Ok(LedgerSummary::tally(
            &proposals,
            members.quorum_size(),
            members.size(),
        ))
    }

    pub fn len(&self) -> usize {
        locks::read(&self.proposals).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All proposals in id order.
    pub fn copy_all(&self) -> Vec<Proposal> {
        let map = locks::read(&self.proposals);
        map.values().map(|h| locks::lock(h).clone()).collect()
    }

    /// Exclusive access to the proposal map, for operations that must see
    /// (and keep) the ledger unchanged: configure and restore.
    pub(crate) fn lock_map(&self) -> LedgerMapGuard<'_> {
        LedgerMapGuard {
            map: locks::write(&self.proposals),
        }
    }

    fn authorize(&self, caller: &MemberId) -> LedgerResult<Arc<MemberSet>> {
        let members = self.registry.current()?;
        if !members.is_member(caller) {
            return Err(LedgerError::Unauthorized(caller.clone()));
        }
        Ok(members)
    }

    fn validate_draft(
        &self,
        recipient: &str,
        asset: &str,
        amount: &str,
        description: &str,
    ) -> LedgerResult<(MemberId, Asset, Amount, String)> {
        if !self.caps.format.is_member_identifier(recipient) {
            return Err(LedgerError::InvalidRecipient(recipient.to_string()));
        }

        let asset = Asset::parse(asset);
        if let Asset::Contract(contract) = &asset {
            if !self.caps.format.is_asset_identifier(contract) {
                return Err(LedgerError::InvalidAsset(contract.clone()));
            }
        }

        let amount = Amount::parse(amount)?;
        let description = self.caps.sanitizer.sanitize(description);

        Ok((MemberId::new(recipient), asset, amount, description))
    }
}

/// Write guard over the proposal map.
pub(crate) struct LedgerMapGuard<'a> {
    map: RwLockWriteGuard<'a, ProposalMap>,
}

impl LedgerMapGuard<'_> {
    pub(crate) fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Replace every proposal. Caller has validated `proposals`.
    pub(crate) fn replace(&mut self, proposals: Vec<Proposal>) {
        self.map.clear();
        for proposal in proposals {
            self.map.insert(proposal.id, Arc::new(Mutex::new(proposal)));
        }
    }
}
