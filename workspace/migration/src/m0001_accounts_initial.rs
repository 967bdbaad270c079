use sea_orm_migration::{prelude::*, schema::*};

use crate::change::{ChangeId, ChangeUnit};

pub struct Migration;

impl ChangeUnit for Migration {
    const ID: ChangeId = crate::change_id!("accounts", "0001_initial");
    const DEPENDENCIES: &'static [ChangeId] = &[];
}

impl MigrationName for Migration {
    fn name(&self) -> &str {
        Self::ID.version
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string_len(Users::Username, 150).unique_key())
                    .col(string_null(Users::Email))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Username,
    Email,
}
