//! Engine errors.
//!
//! Every precondition violation is reported as a [`LedgerError`] before any
//! state is touched. Nothing here is fatal; callers decide whether to retry.

use thiserror::Error;

use crate::types::{MemberId, ProposalId};

/// Result type for engine operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// No membership has been configured yet.
    #[error("multisig is not configured")]
    NotConfigured,

    /// Membership already configured and proposals exist.
    #[error("multisig is already configured and has proposals")]
    AlreadyConfigured,

    /// A member identifier does not match the identifier format.
    #[error("invalid member identifier: {0}")]
    InvalidIdentifier(String),

    /// The same member was listed more than once.
    #[error("duplicate member: {0}")]
    DuplicateMember(MemberId),

    /// Threshold outside `1..=members`.
    #[error("threshold must be between 1 and {members}, got {threshold}")]
    InvalidThreshold { threshold: u32, members: usize },

    /// Zero members supplied.
    #[error("at least one member is required")]
    EmptyMembership,

    /// More members than the group may hold.
    #[error("at most {max} members are allowed, got {got}")]
    TooManyMembers { got: usize, max: usize },

    /// Caller is not a member.
    #[error("{0} is not a member of this multisig")]
    Unauthorized(MemberId),

    /// No proposal with this id.
    #[error("proposal {0} not found")]
    NotFound(ProposalId),

    /// Caller already approved this proposal.
    #[error("{member} already approved proposal {id}")]
    AlreadyApproved { id: ProposalId, member: MemberId },

    /// Proposal was executed; it accepts no further approvals or executions.
    #[error("proposal {0} was already executed")]
    AlreadyExecuted(ProposalId),

    /// Not enough approvals to execute.
    #[error("proposal {id} has {approvals} of {threshold} required approvals")]
    QuorumNotMet {
        id: ProposalId,
        approvals: usize,
        threshold: u32,
    },

    /// Recipient does not match the identifier format.
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    /// Asset is neither the native sentinel nor a valid contract identifier.
    #[error("invalid asset: {0}")]
    InvalidAsset(String),

    /// Amount is not a positive decimal with bounded precision.
    #[error("invalid amount '{amount}': {reason}")]
    InvalidAmount { amount: String, reason: String },

    /// Every proposal id has been handed out.
    #[error("no proposal ids left after {0}")]
    IdsExhausted(ProposalId),

    /// A snapshot handed to `restore` breaks an engine invariant.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

impl LedgerError {
    /// Short machine-friendly name, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::AlreadyConfigured => "already_configured",
            Self::InvalidIdentifier(_) => "invalid_identifier",
            Self::DuplicateMember(_) => "duplicate_member",
            Self::InvalidThreshold { .. } => "invalid_threshold",
            Self::EmptyMembership => "empty_membership",
            Self::TooManyMembers { .. } => "too_many_members",
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::AlreadyApproved { .. } => "already_approved",
            Self::AlreadyExecuted(_) => "already_executed",
            Self::QuorumNotMet { .. } => "quorum_not_met",
            Self::InvalidRecipient(_) => "invalid_recipient",
            Self::InvalidAsset(_) => "invalid_asset",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::IdsExhausted(_) => "ids_exhausted",
            Self::InvalidSnapshot(_) => "invalid_snapshot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            LedgerError::NotFound(ProposalId(7)).to_string(),
            "proposal #7 not found"
        );
        assert_eq!(
            LedgerError::QuorumNotMet {
                id: ProposalId(2),
                approvals: 1,
                threshold: 2
            }
            .to_string(),
            "proposal #2 has 1 of 2 required approvals"
        );
        assert_eq!(
            LedgerError::InvalidThreshold {
                threshold: 0,
                members: 3
            }
            .to_string(),
            "threshold must be between 1 and 3, got 0"
        );
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(LedgerError::NotConfigured.kind(), "not_configured");
        assert_eq!(
            LedgerError::AlreadyExecuted(ProposalId(1)).kind(),
            "already_executed"
        );
    }
}
