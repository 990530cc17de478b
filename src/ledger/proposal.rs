//! Proposal record and its status.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Amount, Asset, MemberId, ProposalId, Receipt, Timestamp};

/// A request to move `amount` of `asset` to `recipient`, pending group approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub recipient: MemberId,
    pub asset: Asset,
    pub amount: Amount,
    /// Sanitized free text.
    pub description: String,
    pub created_by: MemberId,
    pub created_at: Timestamp,
    pub status: ProposalStatus,
}

/// Stored lifecycle state.
///
/// `Ready` is not stored: it is an open proposal whose approvals reach the
/// threshold (see [`Proposal::phase`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Open {
        approvers: Vec<MemberId>,
    },
    Executed {
        approvers: Vec<MemberId>,
        executed_at: Timestamp,
        receipt: Receipt,
    },
}

/// Observed phase of a proposal under a given threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalPhase {
    Pending,
    Ready,
    Executed,
}

impl fmt::Display for ProposalPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProposalPhase::Pending => f.write_str("pending"),
            ProposalPhase::Ready => f.write_str("ready"),
            ProposalPhase::Executed => f.write_str("executed"),
        }
    }
}

impl Proposal {
    /// Approvers in approval order. The creator is always first.
    pub fn approvers(&self) -> &[MemberId] {
        match &self.status {
            ProposalStatus::Open { approvers } => approvers,
            ProposalStatus::Executed { approvers, .. } => approvers,
        }
    }

    pub fn approval_count(&self) -> usize {
        self.approvers().len()
    }

    pub fn has_approved(&self, member: &MemberId) -> bool {
        self.approvers().contains(member)
    }

    pub fn is_executed(&self) -> bool {
        matches!(self.status, ProposalStatus::Executed { .. })
    }

    pub fn executed_at(&self) -> Option<Timestamp> {
        match &self.status {
            ProposalStatus::Executed { executed_at, .. } => Some(*executed_at),
            ProposalStatus::Open { .. } => None,
        }
    }

    pub fn receipt(&self) -> Option<&Receipt> {
        match &self.status {
            ProposalStatus::Executed { receipt, .. } => Some(receipt),
            ProposalStatus::Open { .. } => None,
        }
    }

    /// Open with enough approvals to execute.
    pub fn is_ready(&self, threshold: u32) -> bool {
        !self.is_executed() && self.approval_count() >= threshold as usize
    }

    /// Approvals still missing before execution is allowed (0 once ready).
    pub fn approvals_needed(&self, threshold: u32) -> usize {
        (threshold as usize).saturating_sub(self.approval_count())
    }

    pub fn phase(&self, threshold: u32) -> ProposalPhase {
        if self.is_executed() {
            ProposalPhase::Executed
        } else if self.is_ready(threshold) {
            ProposalPhase::Ready
        } else {
            ProposalPhase::Pending
        }
    }

    /// Append an approver. Caller has checked the proposal is open and the
    /// member has not approved yet.
    pub(crate) fn push_approver(&mut self, member: MemberId) {
        if let ProposalStatus::Open { approvers } = &mut self.status {
            approvers.push(member);
        }
    }

    /// Freeze the approvers and record the settlement.
    pub(crate) fn mark_executed(&mut self, executed_at: Timestamp, receipt: Receipt) {
        if let ProposalStatus::Open { approvers } = &mut self.status {
            let approvers = std::mem::take(approvers);
            self.status = ProposalStatus::Executed {
                approvers,
                executed_at,
                receipt,
            };
        }
    }
}
