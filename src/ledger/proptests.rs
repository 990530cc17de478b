//! Property-based tests for membership rules and ledger invariants
//!
//! Tests for:
//! - Configure: valid inputs accepted, threshold bounds, duplicate detection
//! - Ledger: approver uniqueness, quorum before execution, list partition and order

use super::{newest_first, ProposalFilter, ProposalLedger};
use crate::capabilities::mock::{ManualClock, SequentialReceipts};
use crate::capabilities::{Capabilities, StrKeyFormat};
use crate::error::LedgerError;
use crate::registry::{MemberSet, MembershipRegistry};
use crate::types::{MemberId, ProposalId};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

const RECIPIENT: &str = "GDQRGJ4D2ZPLVFJQM3KRD5ORAIHPNZ4VNMQMZPGX7GJWMQM3RVMJZQHG";
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

fn member_id() -> impl Strategy<Value = MemberId> {
    prop::collection::vec(prop::sample::select(ALPHABET), 55).prop_map(|tail| {
        let tail: String = tail.into_iter().map(char::from).collect();
        MemberId::new(format!("G{}", tail))
    })
}

fn unique_members(max: usize) -> impl Strategy<Value = Vec<MemberId>> {
    prop::collection::hash_set(member_id(), 1..=max).prop_map(|set| set.into_iter().collect())
}

#[derive(Debug, Clone)]
enum Op {
    Create { caller: usize },
    Approve { caller: usize, target: usize },
    Execute { caller: usize, target: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..12usize).prop_map(|caller| Op::Create { caller }),
        (0..12usize, 0..20usize).prop_map(|(caller, target)| Op::Approve { caller, target }),
        (0..12usize, 0..20usize).prop_map(|(caller, target)| Op::Execute { caller, target }),
    ]
}

// ============================================================================
// CONFIGURE PROPERTIES
// ============================================================================

proptest! {
    /// Property: any well-formed unique member list with 1 <= t <= n configures
    #[test]
    fn configure_accepts_valid_input(
        (members, threshold) in unique_members(10)
            .prop_flat_map(|m| { let n = m.len() as u32; (Just(m), 1..=n) }),
    ) {
        let registry = MembershipRegistry::new();
        registry.configure(members.clone(), threshold, &StrKeyFormat).unwrap();

        prop_assert_eq!(registry.quorum_size().unwrap(), threshold);
        prop_assert_eq!(registry.size().unwrap(), members.len());
        for m in &members {
            prop_assert!(registry.is_member(m).unwrap());
        }
    }

    /// Property: threshold 0 or above member count is always InvalidThreshold
    #[test]
    fn configure_rejects_out_of_range_threshold(
        members in unique_members(10),
        excess in 1u32..20,
        zero in any::<bool>(),
    ) {
        let threshold = if zero { 0 } else { members.len() as u32 + excess };
        let result = MemberSet::new(members, threshold, &StrKeyFormat);
        let is_invalid_threshold = matches!(result, Err(LedgerError::InvalidThreshold { .. }));
        prop_assert!(is_invalid_threshold);
    }

    /// Property: a repeated member is always DuplicateMember
    #[test]
    fn configure_rejects_duplicates(
        members in unique_members(9),
        pick in any::<prop::sample::Index>(),
    ) {
        let duplicate = pick.get(&members).clone();
        let mut with_dup = members.clone();
        with_dup.push(duplicate.clone());
        let threshold = members.len() as u32;

        let result = MemberSet::new(with_dup, threshold, &StrKeyFormat);
        prop_assert_eq!(result, Err(LedgerError::DuplicateMember(duplicate)));
    }
}

// ============================================================================
// LEDGER PROPERTIES
// ============================================================================

proptest! {
    /// Property: after any operation sequence the ledger invariants hold and
    /// pending/ready/executed partition the full list.
    #[test]
    fn ledger_invariants_hold(
        (members, threshold) in unique_members(5)
            .prop_flat_map(|m| { let n = m.len() as u32; (Just(m), 1..=n) }),
        ops in prop::collection::vec(op(), 0..60),
    ) {
        let registry = Arc::new(MembershipRegistry::new());
        registry.configure(members.clone(), threshold, &StrKeyFormat).unwrap();
        let caps = Capabilities::default()
            // Frozen clock: every created_at collides, exercising the id tie-break
            .with_clock(Arc::new(ManualClock::new(7)))
            .with_receipts(Arc::new(SequentialReceipts::new()));
        let ledger = ProposalLedger::new(registry, caps);

        // Callers past the member list are outsiders
        let outsider = MemberId::new(format!("G{}", "7".repeat(55)));
        let who = |i: usize| members.get(i).cloned().unwrap_or_else(|| outsider.clone());

        let mut created = 0u64;
        for op in ops {
            match op {
                Op::Create { caller } => {
                    let caller = who(caller);
                    let result = ledger.create_proposal(&caller, RECIPIENT, "NATIVE", "1", "");
                    if members.contains(&caller) {
                        created += 1;
                        let proposal = result.unwrap();
                        prop_assert_eq!(proposal.id, ProposalId(created));
                        prop_assert_eq!(proposal.approvers(), &[caller][..]);
                    } else {
                        prop_assert!(result.is_err());
                    }
                }
                Op::Approve { caller, target } => {
                    let id = ProposalId(target as u64 + 1);
                    let before = ledger.get(id).ok();
                    let result = ledger.approve(&who(caller), id);
                    if let (Some(before), Err(_)) = (before, &result) {
                        prop_assert_eq!(ledger.get(id).unwrap(), before);
                    }
                }
                Op::Execute { caller, target } => {
                    let id = ProposalId(target as u64 + 1);
                    let before = ledger.get(id).ok();
                    match ledger.execute(&who(caller), id) {
                        Ok(p) => prop_assert!(p.approval_count() >= threshold as usize),
                        Err(_) => {
                            if let Some(before) = before {
                                prop_assert_eq!(ledger.get(id).unwrap(), before);
                            }
                        }
                    }
                }
            }
        }

        let all: Vec<_> = ledger.list(ProposalFilter::All).collect();
        prop_assert_eq!(all.len() as u64, created);
        prop_assert!(all.windows(2).all(|w| newest_first(&w[0], &w[1]).is_lt()));

        for p in &all {
            let unique: HashSet<_> = p.approvers().iter().collect();
            prop_assert_eq!(unique.len(), p.approval_count());
            prop_assert!(p.approvers().iter().all(|a| members.contains(a)));
            if p.is_executed() {
                prop_assert!(p.approval_count() >= threshold as usize);
                prop_assert!(p.receipt().is_some());
            }
        }

        let mut parts: Vec<ProposalId> = [ProposalFilter::Pending, ProposalFilter::Ready, ProposalFilter::Executed]
            .into_iter()
            .flat_map(|f| ledger.list(f).map(|p| p.id).collect::<Vec<_>>())
            .collect();
        let parts_len = parts.len();
        parts.sort();
        parts.dedup();
        prop_assert_eq!(parts.len(), parts_len, "filters overlap");
        let mut all_ids: Vec<_> = all.iter().map(|p| p.id).collect();
        all_ids.sort();
        prop_assert_eq!(parts, all_ids, "filters omit proposals");
    }
}
