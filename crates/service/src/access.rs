//! Access predicates applied by the controllers before mutating calls.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::auth::domain::Principal;
use crate::errors::ServiceError;

/// Resolves the login that owns a resource.
#[async_trait]
pub trait OwnerLookup: Send + Sync {
    type Id: Debug + Send + Sync;

    /// `Ok(None)` when the resource does not exist.
    async fn owner_login(&self, id: &Self::Id) -> Result<Option<String>, ServiceError>;
}

/// Decides whether a principal may patch or delete a resource.
///
/// The owner is looked up first, so a missing resource or a failed lookup
/// denies every caller, administrators included.
pub struct AccessHandler<L: OwnerLookup> {
    lookup: Arc<L>,
}

impl<L: OwnerLookup> Clone for AccessHandler<L> {
    fn clone(&self) -> Self { Self { lookup: self.lookup.clone() } }
}

impl<L: OwnerLookup> AccessHandler<L> {
    pub fn new(lookup: Arc<L>) -> Self { Self { lookup } }

    pub async fn can_patch(&self, principal: Option<&Principal>, id: &L::Id) -> bool {
        let Some(principal) = principal else {
            return false;
        };
        let owner = match self.lookup.owner_login(id).await {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                warn!(?id, caller = %principal.login, "access denied: resource not found");
                return false;
            }
            Err(e) => {
                warn!(?id, caller = %principal.login, error = %e, "access denied: owner lookup failed");
                return false;
            }
        };
        principal.is_admin() || principal.login == owner
    }

    pub async fn can_delete(&self, principal: Option<&Principal>, id: &L::Id) -> bool {
        self.can_patch(principal, id).await
    }
}

/// Creation rule: ADMIN, or the payload's owner login is the caller's own.
pub fn can_create(principal: Option<&Principal>, owner_login: Option<&str>) -> bool {
    match (principal, owner_login) {
        (Some(p), _) if p.is_admin() => true,
        (Some(p), Some(owner)) => p.login == owner,
        _ => false,
    }
}
