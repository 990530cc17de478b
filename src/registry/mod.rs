//! Membership registry: who may approve, and how many approvals it takes.
//!
//! The registry holds at most one [`MemberSet`]. Readers take an
//! `Arc` snapshot and release the lock immediately, so quorum checks never
//! hold the registry lock while a proposal is locked.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::capabilities::IdentifierFormat;
use crate::error::{LedgerError, LedgerResult};
use crate::locks;
use crate::types::MemberId;

/// Largest group the registry accepts.
pub const MAX_MEMBERS: usize = 10;

/// Validated group configuration.
///
/// Invariant: `1 <= threshold <= members.len() <= MAX_MEMBERS`, members
/// unique and well-formed. Fields are private so the only ways in are
/// [`MemberSet::new`] and the validated snapshot restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSet {
    members: Vec<MemberId>,
    threshold: u32,
}

impl MemberSet {
    /// Validate and build a member set.
    ///
    /// Checks run in order: empty, too many, format, duplicates, threshold.
    pub fn new(
        members: Vec<MemberId>,
        threshold: u32,
        format: &dyn IdentifierFormat,
    ) -> LedgerResult<Self> {
        if members.is_empty() {
            return Err(LedgerError::EmptyMembership);
        }
        if members.len() > MAX_MEMBERS {
            return Err(LedgerError::TooManyMembers {
                got: members.len(),
                max: MAX_MEMBERS,
            });
        }

        if let Some(bad) = members
            .iter()
            .find(|m| !format.is_member_identifier(m.as_str()))
        {
            return Err(LedgerError::InvalidIdentifier(bad.to_string()));
        }

        let mut seen = HashSet::with_capacity(members.len());
        for member in &members {
            if !seen.insert(member) {
                return Err(LedgerError::DuplicateMember(member.clone()));
            }
        }

        if threshold == 0 || threshold as usize > members.len() {
            return Err(LedgerError::InvalidThreshold {
                threshold,
                members: members.len(),
            });
        }

        Ok(Self { members, threshold })
    }

    /// Re-run [`MemberSet::new`] over a value that bypassed it (deserialized).
    pub fn revalidate(&self, format: &dyn IdentifierFormat) -> LedgerResult<()> {
        Self::new(self.members.clone(), self.threshold, format).map(|_| ())
    }

    pub fn is_member(&self, id: &MemberId) -> bool {
        self.members.contains(id)
    }

    /// Approvals required before a proposal may execute.
    pub fn quorum_size(&self) -> u32 {
        self.threshold
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Members in configuration order.
    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    pub fn is_quorum(&self, approvals: usize) -> bool {
        approvals >= self.threshold as usize
    }
}

/// Owner of the current [`MemberSet`].
#[derive(Debug, Default)]
pub struct MembershipRegistry {
    current: RwLock<Option<Arc<MemberSet>>>,
}

impl MembershipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and install a configuration, replacing any previous one.
    ///
    /// Whether replacement is allowed at all is decided by the caller
    /// (see `Multisig::configure`).
    pub fn configure(
        &self,
        members: Vec<MemberId>,
        threshold: u32,
        format: &dyn IdentifierFormat,
    ) -> LedgerResult<Arc<MemberSet>> {
        let set = Arc::new(MemberSet::new(members, threshold, format)?);
        self.install(Some(set.clone()));
        Ok(set)
    }

    pub(crate) fn install(&self, set: Option<Arc<MemberSet>>) {
        *locks::write(&self.current) = set;
    }

    /// Snapshot of the current configuration.
    pub fn current(&self) -> LedgerResult<Arc<MemberSet>> {
        locks::read(&self.current)
            .clone()
            .ok_or(LedgerError::NotConfigured)
    }

    pub fn is_configured(&self) -> bool {
        locks::read(&self.current).is_some()
    }

    pub fn is_member(&self, id: &MemberId) -> LedgerResult<bool> {
        Ok(self.current()?.is_member(id))
    }

    pub fn quorum_size(&self) -> LedgerResult<u32> {
        Ok(self.current()?.quorum_size())
    }

    pub fn size(&self) -> LedgerResult<usize> {
        Ok(self.current()?.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::StrKeyFormat;

    fn member(n: u8) -> MemberId {
        // 'A' + n keeps every id inside the base32 alphabet
        let c = (b'A' + n) as char;
        MemberId::new(format!("G{}", c.to_string().repeat(55)))
    }

    #[test]
    fn test_configure_and_query() {
        let registry = MembershipRegistry::new();
        registry
            .configure(vec![member(0), member(1), member(2)], 2, &StrKeyFormat)
            .unwrap();

        assert!(registry.is_configured());
        assert_eq!(registry.quorum_size().unwrap(), 2);
        assert_eq!(registry.size().unwrap(), 3);
        assert!(registry.is_member(&member(1)).unwrap());
        assert!(!registry.is_member(&member(5)).unwrap());
    }

    #[test]
    fn test_unconfigured_queries_fail() {
        let registry = MembershipRegistry::new();
        assert_eq!(registry.quorum_size(), Err(LedgerError::NotConfigured));
        assert_eq!(registry.size(), Err(LedgerError::NotConfigured));
        assert_eq!(
            registry.is_member(&member(0)),
            Err(LedgerError::NotConfigured)
        );
    }

    #[test]
    fn test_empty_membership() {
        let result = MemberSet::new(vec![], 1, &StrKeyFormat);
        assert_eq!(result, Err(LedgerError::EmptyMembership));
    }

    #[test]
    fn test_too_many_members() {
        let members: Vec<_> = (0..11).map(member).collect();
        let result = MemberSet::new(members, 1, &StrKeyFormat);
        assert_eq!(
            result,
            Err(LedgerError::TooManyMembers { got: 11, max: 10 })
        );
    }

    #[test]
    fn test_ten_members_allowed() {
        let members: Vec<_> = (0..10).map(member).collect();
        let set = MemberSet::new(members, 10, &StrKeyFormat).unwrap();
        assert_eq!(set.size(), 10);
        assert_eq!(set.quorum_size(), 10);
    }

    #[test]
    fn test_invalid_identifier() {
        let result = MemberSet::new(
            vec![member(0), MemberId::new("not-an-address")],
            1,
            &StrKeyFormat,
        );
        assert_eq!(
            result,
            Err(LedgerError::InvalidIdentifier("not-an-address".to_string()))
        );
    }

    #[test]
    fn test_duplicate_member() {
        let result = MemberSet::new(vec![member(0), member(1), member(0)], 2, &StrKeyFormat);
        assert_eq!(result, Err(LedgerError::DuplicateMember(member(0))));
    }

    #[test]
    fn test_threshold_bounds() {
        let members = vec![member(0), member(1)];
        assert!(matches!(
            MemberSet::new(members.clone(), 0, &StrKeyFormat),
            Err(LedgerError::InvalidThreshold { threshold: 0, .. })
        ));
        assert!(matches!(
            MemberSet::new(members.clone(), 3, &StrKeyFormat),
            Err(LedgerError::InvalidThreshold { threshold: 3, .. })
        ));
        assert!(MemberSet::new(members, 2, &StrKeyFormat).is_ok());
    }

    #[test]
    fn test_failed_configure_keeps_previous() {
        let registry = MembershipRegistry::new();
        registry
            .configure(vec![member(0)], 1, &StrKeyFormat)
            .unwrap();

        let result = registry.configure(vec![member(1)], 2, &StrKeyFormat);
        assert!(result.is_err());
        assert!(registry.is_member(&member(0)).unwrap());
        assert_eq!(registry.quorum_size().unwrap(), 1);
    }

    #[test]
    fn test_members_keep_configuration_order() {
        let set = MemberSet::new(vec![member(2), member(0), member(1)], 1, &StrKeyFormat)
            .unwrap();
        assert_eq!(set.members(), &[member(2), member(0), member(1)]);
    }
}
