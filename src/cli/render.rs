//! Human-readable and JSON output for proposals and the group.

use cosign::{LedgerSummary, MemberSet, Proposal, ProposalPhase};
use serde::Serialize;

/// One-line listing entry.
pub fn proposal_line(proposal: &Proposal, threshold: u32) -> String {
    let phase = proposal.phase(threshold);
    let mut line = format!(
        "{:<5} {:<8} {} {} -> {}  ({}/{} approvals)",
        proposal.id.to_string(),
        phase.to_string(),
        proposal.amount.as_str(),
        proposal.asset.label(),
        proposal.recipient.short(),
        proposal.approval_count(),
        threshold,
    );
    if !proposal.description.is_empty() {
        line.push_str(&format!("  {}", proposal.description));
    }
    line
}

/// Full proposal view for `show`.
pub fn proposal_detail(proposal: &Proposal, threshold: u32) -> String {
    let mut out = String::new();
    out.push_str(&format!("Proposal {}\n", proposal.id));
    out.push_str(&format!("  Status:      {}\n", proposal.phase(threshold)));
    out.push_str(&format!(
        "  Transfer:    {} {}\n",
        proposal.amount.as_str(),
        proposal.asset.label()
    ));
    out.push_str(&format!("  Recipient:   {}\n", proposal.recipient));
    if !proposal.asset.is_native() {
        out.push_str(&format!("  Asset:       {}\n", proposal.asset));
    }
    if !proposal.description.is_empty() {
        out.push_str(&format!("  Description: {}\n", proposal.description));
    }
    out.push_str(&format!(
        "  Created:     {} by {}\n",
        proposal.created_at,
        proposal.created_by.short()
    ));
    out.push_str(&format!(
        "  Approvals:   {}/{}\n",
        proposal.approval_count(),
        threshold
    ));
    for approver in proposal.approvers() {
        out.push_str(&format!("    - {}\n", approver));
    }

    match proposal.phase(threshold) {
        ProposalPhase::Pending => out.push_str(&format!(
            "  Needs {} more approval(s)\n",
            proposal.approvals_needed(threshold)
        )),
        ProposalPhase::Ready => out.push_str("  Ready to execute\n"),
        ProposalPhase::Executed => {
            if let Some(at) = proposal.executed_at() {
                out.push_str(&format!("  Executed:    {}\n", at));
            }
            if let Some(receipt) = proposal.receipt() {
                out.push_str(&format!("  Receipt:     {}\n", receipt.as_str()));
            }
        }
    }
    out
}

/// Group and ledger overview for `status`.
pub fn status_text(members: &MemberSet, summary: &LedgerSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Group: {}-of-{}\n",
        members.quorum_size(),
        members.size()
    ));
    for member in members.members() {
        out.push_str(&format!("  - {}\n", member));
    }
    out.push('\n');
    out.push_str(&format!("Proposals: {}\n", summary.total));
    out.push_str(&format!("  Pending:  {}\n", summary.pending));
    out.push_str(&format!("  Ready:    {}\n", summary.ready));
    out.push_str(&format!("  Executed: {}\n", summary.executed));
    out
}

/// Proposal plus its derived phase, for `--json`.
#[derive(Serialize)]
pub struct ProposalView<'a> {
    #[serde(flatten)]
    pub proposal: &'a Proposal,
    pub phase: ProposalPhase,
    pub approvals_needed: usize,
}

impl<'a> ProposalView<'a> {
    pub fn new(proposal: &'a Proposal, threshold: u32) -> Self {
        Self {
            proposal,
            phase: proposal.phase(threshold),
            approvals_needed: proposal.approvals_needed(threshold),
        }
    }
}

#[derive(Serialize)]
pub struct StatusView<'a> {
    pub members: &'a [cosign::MemberId],
    pub threshold: u32,
    #[serde(flatten)]
    pub summary: &'a LedgerSummary,
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, Box<dyn std::error::Error>> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosign::capabilities::mock::{ManualClock, SequentialReceipts};
    use cosign::{Capabilities, MemberId, Multisig};
    use std::sync::Arc;

    const RECIPIENT: &str = "GDQRGJ4D2ZPLVFJQM3KRD5ORAIHPNZ4VNMQMZPGX7GJWMQM3RVMJZQHG";

    fn member(c: char) -> MemberId {
        MemberId::new(format!("G{}", c.to_string().repeat(55)))
    }

    fn engine() -> Multisig {
        let multisig = Multisig::with_capabilities(
            Capabilities::default()
                .with_clock(Arc::new(ManualClock::new(1_700_000_000_000)))
                .with_receipts(Arc::new(SequentialReceipts::new())),
        );
        multisig
            .configure(vec![member('A'), member('B'), member('C')], 2)
            .unwrap();
        multisig
    }

    #[test]
    fn test_proposal_line() {
        let multisig = engine();
        let p = multisig
            .create_proposal(&member('A'), RECIPIENT, "NATIVE", "12.5", "Office rent")
            .unwrap();

        let line = proposal_line(&p, 2);
        assert!(line.starts_with("#1"));
        assert!(line.contains("pending"));
        assert!(line.contains("12.5 XLM"));
        assert!(line.contains("GDQRGJ...ZQHG"));
        assert!(line.contains("(1/2 approvals)"));
        assert!(line.ends_with("Office rent"));
    }

    #[test]
    fn test_proposal_detail_pending_and_executed() {
        let multisig = engine();
        let p = multisig
            .create_proposal(&member('A'), RECIPIENT, "NATIVE", "1", "")
            .unwrap();
        let detail = proposal_detail(&p, 2);
        assert!(detail.contains("Needs 1 more approval(s)"));
        assert!(!detail.contains("Description"));

        multisig.approve(&member('B'), p.id).unwrap();
        let done = multisig.execute(&member('C'), p.id).unwrap();
        let detail = proposal_detail(&done, 2);
        assert!(detail.contains("Status:      executed"));
        assert!(detail.contains("Receipt:     receipt-000001"));
    }

    #[test]
    fn test_status_text() {
        let multisig = engine();
        multisig
            .create_proposal(&member('A'), RECIPIENT, "NATIVE", "1", "")
            .unwrap();
        let text = status_text(
            &multisig.members().unwrap(),
            &multisig.summary().unwrap(),
        );
        assert!(text.starts_with("Group: 2-of-3"));
        assert!(text.contains("Proposals: 1"));
        assert!(text.contains("Pending:  1"));
    }

    #[test]
    fn test_proposal_json_has_phase() {
        let multisig = engine();
        let p = multisig
            .create_proposal(&member('A'), RECIPIENT, "NATIVE", "1", "")
            .unwrap();
        let json = to_json(&ProposalView::new(&p, 2)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["id"], 1);
        assert_eq!(value["phase"], "pending");
        assert_eq!(value["approvals_needed"], 1);
    }
}
