//! Identity-to-privilege resolution.
//!
//! # Responsibility
//! - Answer role probes by consulting the external role store.
//! - Map every lookup failure and every missing role document to
//!   unprivileged.
//!
//! # Invariants
//! - A resolution always names the principal id it was probed for, so the
//!   context can discard stale answers.
//! - There is no code path that grants privilege on error.

use crate::identity::provider::RoleLookup;
use log::{debug, warn};
use std::rc::Rc;

/// Outstanding role question produced by a sign-in event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleProbe {
    pub principal_id: String,
}

/// Settled answer to a [`RoleProbe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleResolution {
    pub principal_id: String,
    pub is_privileged: bool,
}

impl RoleResolution {
    /// Fail-closed default for a principal.
    pub fn unprivileged(principal_id: impl Into<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
            is_privileged: false,
        }
    }
}

/// Resolves role probes against the external role store.
pub struct IdentityResolver {
    roles: Rc<dyn RoleLookup>,
}

impl IdentityResolver {
    pub fn new(roles: Rc<dyn RoleLookup>) -> Self {
        Self { roles }
    }

    /// Answers one probe.
    ///
    /// # Contract
    /// - Role document present: its `is_privileged` flag is the answer.
    /// - Role document absent: unprivileged.
    /// - Lookup failure: unprivileged, logged; never surfaced as an error.
    pub fn resolve(&self, probe: &RoleProbe) -> RoleResolution {
        match self.roles.lookup_role(&probe.principal_id) {
            Ok(Some(record)) => {
                debug!(
                    "event=role_resolved module=identity status=ok principal={} privileged={}",
                    probe.principal_id, record.is_privileged
                );
                RoleResolution {
                    principal_id: probe.principal_id.clone(),
                    is_privileged: record.is_privileged,
                }
            }
            Ok(None) => {
                debug!(
                    "event=role_resolved module=identity status=absent principal={}",
                    probe.principal_id
                );
                RoleResolution::unprivileged(probe.principal_id.clone())
            }
            Err(err) => {
                warn!(
                    "event=role_resolved module=identity status=error principal={} error={}",
                    probe.principal_id, err
                );
                RoleResolution::unprivileged(probe.principal_id.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{IdentityResolver, RoleProbe};
    use crate::identity::provider::{RoleLookup, RoleLookupError, RoleRecord};
    use std::rc::Rc;

    struct FailingRoles;

    impl RoleLookup for FailingRoles {
        fn lookup_role(&self, _: &str) -> Result<Option<RoleRecord>, RoleLookupError> {
            Err(RoleLookupError::Unavailable("store offline".to_string()))
        }
    }

    struct FixedRoles(Option<RoleRecord>);

    impl RoleLookup for FixedRoles {
        fn lookup_role(&self, _: &str) -> Result<Option<RoleRecord>, RoleLookupError> {
            Ok(self.0)
        }
    }

    fn probe() -> RoleProbe {
        RoleProbe {
            principal_id: "uid-1".to_string(),
        }
    }

    #[test]
    fn lookup_failure_resolves_unprivileged() {
        let resolver = IdentityResolver::new(Rc::new(FailingRoles));
        let resolution = resolver.resolve(&probe());
        assert_eq!(resolution.principal_id, "uid-1");
        assert!(!resolution.is_privileged);
    }

    #[test]
    fn absent_role_document_resolves_unprivileged() {
        let resolver = IdentityResolver::new(Rc::new(FixedRoles(None)));
        assert!(!resolver.resolve(&probe()).is_privileged);
    }

    #[test]
    fn present_role_document_carries_its_flag() {
        let resolver = IdentityResolver::new(Rc::new(FixedRoles(Some(RoleRecord {
            is_privileged: true,
        }))));
        assert!(resolver.resolve(&probe()).is_privileged);

        let resolver = IdentityResolver::new(Rc::new(FixedRoles(Some(RoleRecord {
            is_privileged: false,
        }))));
        assert!(!resolver.resolve(&probe()).is_privileged);
    }
}
