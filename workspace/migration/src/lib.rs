pub use sea_orm_migration::prelude::*;

pub mod change;
pub mod runner;

mod m0001_accounts_initial;
mod m0001_movies_initial;
mod m0002_accounts_user_followings;

pub use change::{Change, ChangeId, ChangePlan, ChangeUnit};
pub use runner::{ChangeStatus, MigrationError, Outcome, Runner};

pub const ACCOUNTS_INITIAL: ChangeId = m0001_accounts_initial::Migration::ID;
pub const MOVIES_INITIAL: ChangeId = m0001_movies_initial::Migration::ID;
pub const USER_FOLLOWINGS: ChangeId = m0002_accounts_user_followings::Migration::ID;

pub struct Migrator;

impl ChangePlan for Migrator {
    fn changes() -> Vec<Change> {
        vec![
            Change::new(m0001_accounts_initial::Migration),
            Change::new(m0001_movies_initial::Migration),
            Change::new(m0002_accounts_user_followings::Migration),
        ]
    }
}

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        Self::changes()
            .into_iter()
            .map(|change| change.migration)
            .collect()
    }
}
