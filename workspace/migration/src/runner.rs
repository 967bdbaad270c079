//! Ordered, dependency-checked application of change units.
//!
//! Every change unit declares the units it depends on. The runner refuses to
//! apply a unit whose dependencies are not recorded as applied, and treats a
//! unit that is already recorded as a no-op. Each unit runs inside its own
//! transaction together with the bookkeeping row, so a failed `up` leaves
//! neither schema changes nor a record behind.

use std::collections::HashSet;
use std::marker::PhantomData;

use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    TransactionTrait,
};
use sea_orm_migration::{seaql_migrations, MigratorTrait, SchemaManager};
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

use crate::change::{Change, ChangeId, ChangePlan};

/// Error types for applying change units
#[derive(Error, Debug)]
pub enum MigrationError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Unknown change unit '{0}'")]
    UnknownChange(String),

    #[error("Change unit {0} is declared more than once")]
    Duplicate(ChangeId),

    #[error("Change unit {change} depends on {dependency}, which is not declared")]
    MissingDependency { change: ChangeId, dependency: ChangeId },

    #[error("Change unit {change} is declared before its dependency {dependency}")]
    OutOfOrder { change: ChangeId, dependency: ChangeId },

    #[error("Change unit {change} cannot be applied: dependency {dependency} has not been applied")]
    UnmetDependency { change: ChangeId, dependency: ChangeId },

    #[error("Change unit {change} is applied before its dependency {dependency}")]
    InconsistentHistory { change: ChangeId, dependency: ChangeId },

    #[error("Change unit {change} cannot be unapplied while {dependent} is applied")]
    HasDependents { change: ChangeId, dependent: ChangeId },

    #[error("Change unit {0} is not applied")]
    NotApplied(ChangeId),
}

/// Result of applying a single change unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    AlreadyApplied,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeStatus {
    pub id: ChangeId,
    pub applied: bool,
}

/// Applies the change units of migrator `M` in declared order.
pub struct Runner<M> {
    changes: Vec<Change>,
    _migrator: PhantomData<M>,
}

impl<M> Runner<M>
where
    M: MigratorTrait + ChangePlan,
{
    /// Loads the plan of `M` and validates its ordering.
    pub fn new() -> Result<Self, MigrationError> {
        let changes = M::changes();
        Self::validate(&changes)?;
        Ok(Self {
            changes,
            _migrator: PhantomData,
        })
    }

    /// Checks that ids are unique and that every dependency is declared
    /// earlier in the list than the change depending on it.
    pub fn validate(changes: &[Change]) -> Result<(), MigrationError> {
        let declared: HashSet<ChangeId> = changes.iter().map(|change| change.id).collect();
        let mut seen = HashSet::with_capacity(changes.len());

        for change in changes {
            if seen.contains(&change.id) {
                return Err(MigrationError::Duplicate(change.id));
            }
            for dependency in change.dependencies {
                if !declared.contains(dependency) {
                    return Err(MigrationError::MissingDependency {
                        change: change.id,
                        dependency: *dependency,
                    });
                }
                if !seen.contains(dependency) {
                    return Err(MigrationError::OutOfOrder {
                        change: change.id,
                        dependency: *dependency,
                    });
                }
            }
            seen.insert(change.id);
        }

        Ok(())
    }

    /// Ids of all change units in plan order.
    pub fn ids(&self) -> Vec<ChangeId> {
        self.changes.iter().map(|change| change.id).collect()
    }

    /// Resolves an `"app_label.name"` string to a known change id.
    pub fn resolve(&self, version: &str) -> Result<ChangeId, MigrationError> {
        ChangeId::lookup(version, self.changes.iter().map(|change| &change.id))
            .ok_or_else(|| MigrationError::UnknownChange(version.to_string()))
    }

    fn find(&self, id: ChangeId) -> Result<&Change, MigrationError> {
        self.changes
            .iter()
            .find(|change| change.id == id)
            .ok_or_else(|| MigrationError::UnknownChange(id.version.to_string()))
    }

    async fn applied_versions(&self, db: &DatabaseConnection) -> Result<HashSet<String>, MigrationError> {
        M::install(db).await?;
        let records = seaql_migrations::Entity::find().all(db).await?;
        Ok(records.into_iter().map(|record| record.version).collect())
    }

    /// Every change unit with its applied state, in plan order.
    pub async fn status(&self, db: &DatabaseConnection) -> Result<Vec<ChangeStatus>, MigrationError> {
        trace!("Reading change unit status");
        let applied = self.applied_versions(db).await?;

        for change in self.changes.iter().filter(|change| applied.contains(change.id.version)) {
            if let Some(dependency) = change
                .dependencies
                .iter()
                .find(|dependency| !applied.contains(dependency.version))
            {
                error!("Change unit {} is recorded without its dependency {}", change.id, dependency);
                return Err(MigrationError::InconsistentHistory {
                    change: change.id,
                    dependency: *dependency,
                });
            }
        }

        Ok(self
            .changes
            .iter()
            .map(|change| ChangeStatus {
                id: change.id,
                applied: applied.contains(change.id.version),
            })
            .collect())
    }

    /// Applies exactly one change unit.
    ///
    /// Returns [`Outcome::AlreadyApplied`] without touching the database when
    /// the unit is already recorded. Fails with
    /// [`MigrationError::UnmetDependency`] before any schema change when a
    /// dependency has not been applied.
    pub async fn apply(&self, db: &DatabaseConnection, id: ChangeId) -> Result<Outcome, MigrationError> {
        let change = self.find(id)?;
        let applied = self.applied_versions(db).await?;

        if applied.contains(id.version) {
            debug!("Change unit {} already applied, skipping", id);
            return Ok(Outcome::AlreadyApplied);
        }

        if let Some(dependency) = change
            .dependencies
            .iter()
            .find(|dependency| !applied.contains(dependency.version))
        {
            warn!("Refusing to apply {}: dependency {} is not applied", id, dependency);
            return Err(MigrationError::UnmetDependency {
                change: id,
                dependency: *dependency,
            });
        }

        info!("Applying change unit {}", id);
        let txn = db.begin().await?;
        let manager = SchemaManager::new(&txn);
        change.migration.up(&manager).await?;

        seaql_migrations::Entity::insert(seaql_migrations::ActiveModel {
            version: Set(id.version.to_string()),
            applied_at: Set(chrono::Utc::now().timestamp()),
        })
        .exec_without_returning(&txn)
        .await?;
        txn.commit().await?;

        info!("Change unit {} applied", id);
        Ok(Outcome::Applied)
    }

    /// Applies every pending change unit in plan order and returns the ones
    /// applied by this call.
    pub async fn migrate(&self, db: &DatabaseConnection) -> Result<Vec<ChangeId>, MigrationError> {
        self.status(db).await?;

        let mut applied_now = Vec::new();
        for change in &self.changes {
            if self.apply(db, change.id).await? == Outcome::Applied {
                applied_now.push(change.id);
            }
        }

        if applied_now.is_empty() {
            info!("No change units to apply");
        }
        Ok(applied_now)
    }

    /// Applies `target` and its transitive dependencies, nothing else.
    pub async fn migrate_to(&self, db: &DatabaseConnection, target: ChangeId) -> Result<Vec<ChangeId>, MigrationError> {
        let mut needed = HashSet::new();
        let mut stack = vec![target];
        while let Some(id) = stack.pop() {
            if needed.insert(id) {
                stack.extend(self.find(id)?.dependencies.iter().copied());
            }
        }
        debug!("Migrating to {} requires {} change unit(s)", target, needed.len());

        self.status(db).await?;

        let mut applied_now = Vec::new();
        for change in self.changes.iter().filter(|change| needed.contains(&change.id)) {
            if self.apply(db, change.id).await? == Outcome::Applied {
                applied_now.push(change.id);
            }
        }
        Ok(applied_now)
    }

    /// Reverts one applied change unit and removes its record.
    pub async fn unapply(&self, db: &DatabaseConnection, id: ChangeId) -> Result<(), MigrationError> {
        let change = self.find(id)?;
        let applied = self.applied_versions(db).await?;

        if !applied.contains(id.version) {
            return Err(MigrationError::NotApplied(id));
        }

        if let Some(dependent) = self.changes.iter().find(|other| {
            applied.contains(other.id.version) && other.dependencies.contains(&id)
        }) {
            return Err(MigrationError::HasDependents {
                change: id,
                dependent: dependent.id,
            });
        }

        info!("Unapplying change unit {}", id);
        let txn = db.begin().await?;
        let manager = SchemaManager::new(&txn);
        change.migration.down(&manager).await?;

        seaql_migrations::Entity::delete_many()
            .filter(seaql_migrations::Column::Version.eq(id.version))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        Ok(())
    }
}
