use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Entity families that emit change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    /// Tenant organization.
    Institution,
    /// Membership of a user in an institution.
    InstitutionUser,
    /// Institution-scoped role.
    Role,
    /// Institution department.
    Department,
    /// Shared natural person.
    User,
}

impl EntityKind {
    /// Returns the stable topic segment.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Institution => "institution",
            Self::InstitutionUser => "institution-user",
            Self::Role => "role",
            Self::Department => "department",
            Self::User => "user",
        }
    }
}

/// Kind of change that happened to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Row inserted.
    Created,
    /// Row updated.
    Saved,
    /// Row removed or soft deleted.
    Deleted,
}

impl ChangeKind {
    /// Returns the stable topic suffix.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Saved => "saved",
            Self::Deleted => "deleted",
        }
    }
}

/// Fire-and-forget notification carrying only the affected row identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityEvent {
    /// Entity family.
    pub kind: EntityKind,
    /// Change kind.
    pub change: ChangeKind,
    /// Affected row identifier.
    pub id: Uuid,
}

impl EntityEvent {
    /// Creates an event.
    #[must_use]
    pub fn new(kind: EntityKind, change: ChangeKind, id: Uuid) -> Self {
        Self { kind, change, id }
    }

    /// Returns the topic in `<entity>.<change>` form.
    #[must_use]
    pub fn topic(&self) -> String {
        format!("{}.{}", self.kind.as_str(), self.change.as_str())
    }
}
