//! Serializable image of the whole engine state.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::capabilities::IdentifierFormat;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Proposal;
use crate::registry::MemberSet;
use crate::types::{Amount, Asset, Timestamp};

/// Current snapshot schema.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Membership plus every proposal, as handed to a [`super::StateStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u32,
    #[serde(default)]
    pub members: Option<MemberSet>,
    #[serde(default)]
    pub proposals: Vec<Proposal>,
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            members: None,
            proposals: Vec::new(),
        }
    }
}

impl LedgerSnapshot {
    /// Check everything the engine guarantees for live state.
    ///
    /// A snapshot that passes can be installed as-is.
    pub fn validate(&self, format: &dyn IdentifierFormat) -> LedgerResult<()> {
        let invalid = |msg: String| Err(LedgerError::InvalidSnapshot(msg));

        if self.version != SNAPSHOT_VERSION {
            return invalid(format!("unsupported version {}", self.version));
        }

        let members = match &self.members {
            Some(members) => {
                members
                    .revalidate(format)
                    .map_err(|e| LedgerError::InvalidSnapshot(format!("membership: {}", e)))?;
                members
            }
            None if self.proposals.is_empty() => return Ok(()),
            None => return invalid("proposals present without membership".to_string()),
        };

        let mut ids = HashSet::with_capacity(self.proposals.len());
        for p in &self.proposals {
            if p.id.0 == 0 || !ids.insert(p.id) {
                return invalid(format!("proposal {}: duplicate or zero id", p.id));
            }
            if p.id.next().is_none() {
                return invalid(format!("proposal {}: no id left after it", p.id));
            }
            if let Err(msg) = check_proposal(p, members, format) {
                return invalid(format!("proposal {}: {}", p.id, msg));
            }
        }

        Ok(())
    }
}

fn check_proposal(
    p: &Proposal,
    members: &MemberSet,
    format: &dyn IdentifierFormat,
) -> Result<(), String> {
    if !format.is_member_identifier(p.recipient.as_str()) {
        return Err(format!("invalid recipient {}", p.recipient));
    }
    if let Asset::Contract(contract) = &p.asset {
        if !format.is_asset_identifier(contract) {
            return Err(format!("invalid asset {}", contract));
        }
    }
    Amount::parse(p.amount.as_str()).map_err(|e| e.to_string())?;

    if p.created_at > Timestamp::MAX_RFC3339 {
        return Err(format!("created_at {} out of range", p.created_at.as_millis()));
    }
    if let Some(executed_at) = p.executed_at() {
        if executed_at > Timestamp::MAX_RFC3339 {
            return Err(format!("executed_at {} out of range", executed_at.as_millis()));
        }
        if executed_at < p.created_at {
            return Err("executed before it was created".to_string());
        }
    }

    let approvers = p.approvers();
    if approvers.first() != Some(&p.created_by) {
        return Err("creator is not the first approver".to_string());
    }
    let mut seen = HashSet::with_capacity(approvers.len());
    for approver in approvers {
        if !members.is_member(approver) {
            return Err(format!("approver {} is not a member", approver));
        }
        if !seen.insert(approver) {
            return Err(format!("approver {} listed twice", approver));
        }
    }

    if p.is_executed() && !members.is_quorum(approvers.len()) {
        return Err(format!(
            "executed with {} of {} approvals",
            approvers.len(),
            members.quorum_size()
        ));
    }

    Ok(())
}
