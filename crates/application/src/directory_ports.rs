mod claims;
mod departments;
mod institutions;
mod memberships;
mod roles;

pub use claims::{IdentityClaimsRepository, MembershipGrants};
pub use departments::DepartmentRepository;
pub use institutions::{
    BootstrapInstitutionInput, BootstrapOutcome, InstitutionRepository, InstitutionUpdate,
};
pub use memberships::{
    InstitutionUserRepository, MembershipInput, MembershipUpdate, MembershipWrite,
};
pub use roles::RoleRepository;
