use userhub_core::AppResult;
use userhub_domain::{CallerContext, Privilege};

use crate::{PolicyAction, PrivilegePolicy, authorize};

/// Read access to the global privilege catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrivilegeService;

impl PrivilegeService {
    /// Lists every privilege. Any authenticated caller may read the catalog.
    pub fn list(&self, context: &CallerContext) -> AppResult<Vec<Privilege>> {
        authorize(&PrivilegePolicy, PolicyAction::View, context, None)?;
        Ok(Privilege::all().to_vec())
    }
}
