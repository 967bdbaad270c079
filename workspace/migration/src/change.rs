use std::fmt;

use sea_orm_migration::MigrationTrait;

/// Identity of a change unit: the app that owns it and its name within that app.
///
/// `version` is the key recorded in the migrations table and is always
/// `"<app_label>.<name>"`. Use [`change_id!`](crate::change_id) to build one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChangeId {
    pub app_label: &'static str,
    pub name: &'static str,
    pub version: &'static str,
}

/// Builds a [`ChangeId`] whose version is derived from the app label and name.
#[macro_export]
macro_rules! change_id {
    ($app_label:literal, $name:literal) => {
        $crate::change::ChangeId {
            app_label: $app_label,
            name: $name,
            version: concat!($app_label, ".", $name),
        }
    };
}

impl ChangeId {
    /// Parses `"app_label.name"` against a list of known ids.
    pub fn lookup<'a>(version: &str, known: impl IntoIterator<Item = &'a ChangeId>) -> Option<ChangeId> {
        known.into_iter().find(|id| id.version == version).copied()
    }
}

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.version)
    }
}

/// A migration with a declared identity and the change units it must run after.
pub trait ChangeUnit: MigrationTrait + 'static {
    const ID: ChangeId;
    const DEPENDENCIES: &'static [ChangeId];
}

/// A boxed change unit together with its identity and dependencies.
pub struct Change {
    pub id: ChangeId,
    pub dependencies: &'static [ChangeId],
    pub migration: Box<dyn MigrationTrait>,
}

impl Change {
    pub fn new<M: ChangeUnit>(migration: M) -> Self {
        Self {
            id: M::ID,
            dependencies: M::DEPENDENCIES,
            migration: Box::new(migration),
        }
    }
}

impl fmt::Debug for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Change")
            .field("id", &self.id)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// The ordered list of change units a migrator knows about.
pub trait ChangePlan {
    fn changes() -> Vec<Change>;
}
