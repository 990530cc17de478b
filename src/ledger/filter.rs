//! Listing: filters, ordering and the dashboard summary.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::proposal::{Proposal, ProposalPhase};

/// Which proposals [`super::ProposalLedger::list`] yields.
///
/// `Pending`, `Ready` and `Executed` partition `All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalFilter {
    #[default]
    All,
    Pending,
    Ready,
    Executed,
}

impl ProposalFilter {
    pub fn matches(&self, proposal: &Proposal, threshold: u32) -> bool {
        match self {
            ProposalFilter::All => true,
            ProposalFilter::Pending => proposal.phase(threshold) == ProposalPhase::Pending,
            ProposalFilter::Ready => proposal.phase(threshold) == ProposalPhase::Ready,
            ProposalFilter::Executed => proposal.phase(threshold) == ProposalPhase::Executed,
        }
    }
}

impl FromStr for ProposalFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(ProposalFilter::All),
            "pending" => Ok(ProposalFilter::Pending),
            "ready" => Ok(ProposalFilter::Ready),
            "executed" => Ok(ProposalFilter::Executed),
            _ => Err(format!(
                "Unknown filter: {}. Use 'all', 'pending', 'ready' or 'executed'.",
                s
            )),
        }
    }
}

impl fmt::Display for ProposalFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProposalFilter::All => f.write_str("all"),
            ProposalFilter::Pending => f.write_str("pending"),
            ProposalFilter::Ready => f.write_str("ready"),
            ProposalFilter::Executed => f.write_str("executed"),
        }
    }
}

/// Newest first: `created_at` descending, then `id` descending.
pub fn newest_first(a: &Proposal, b: &Proposal) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

/// Filtered, ordered view over a point-in-time copy of the ledger.
///
/// Holds no locks; later ledger changes are not reflected. Call `list`
/// again to observe them.
pub struct ProposalIter {
    inner: std::vec::IntoIter<Proposal>,
    filter: ProposalFilter,
    threshold: u32,
}

impl ProposalIter {
    pub(crate) fn new(mut proposals: Vec<Proposal>, filter: ProposalFilter, threshold: u32) -> Self {
        proposals.sort_by(newest_first);
        Self {
            inner: proposals.into_iter(),
            filter,
            threshold,
        }
    }

    pub(crate) fn empty(filter: ProposalFilter) -> Self {
        Self::new(Vec::new(), filter, 1)
    }
}

impl Iterator for ProposalIter {
    type Item = Proposal;

    fn next(&mut self) -> Option<Self::Item> {
        let (filter, threshold) = (self.filter, self.threshold);
        self.inner.find(|p| filter.matches(p, threshold))
    }
}

/// Counts shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub total: usize,
    pub pending: usize,
    pub ready: usize,
    pub executed: usize,
    pub threshold: u32,
    pub member_count: usize,
}

impl LedgerSummary {
    pub(crate) fn tally<'a>(
        proposals: impl IntoIterator<Item = &'a Proposal>,
        threshold: u32,
        member_count: usize,
    ) -> Self {
        let mut summary = LedgerSummary {
            threshold,
            member_count,
            ..Default::default()
        };
        for proposal in proposals {
            summary.total += 1;
            match proposal.phase(threshold) {
                ProposalPhase::Pending => summary.pending += 1,
                ProposalPhase::Ready => summary.ready += 1,
                ProposalPhase::Executed => summary.executed += 1,
            }
        }
        summary
    }
}
