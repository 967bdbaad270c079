use sea_orm_migration::{prelude::*, schema::*};

use crate::change::{ChangeId, ChangeUnit};
use crate::m0001_accounts_initial::{self, Users};

/// Adds the `followings` many-to-many attribute to users.
///
/// The attribute is optional (a user may follow nobody) and its reverse
/// accessor is `followers`. Backed by the `user_followings` join table, one
/// row per (follower, followee) pair.
pub struct Migration;

impl ChangeUnit for Migration {
    const ID: ChangeId = crate::change_id!("accounts", "0002_user_followings");
    const DEPENDENCIES: &'static [ChangeId] = &[m0001_accounts_initial::Migration::ID];
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
                    .table(UserFollowings::Table)
                    .if_not_exists()
                    .col(integer(UserFollowings::FollowerId))
                    .col(integer(UserFollowings::FolloweeId))
                    .primary_key(
                        Index::create()
                            .name("pk_user_followings")
                            .col(UserFollowings::FollowerId)
                            .col(UserFollowings::FolloweeId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_followings_follower")
                            .from(UserFollowings::Table, UserFollowings::FollowerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_followings_followee")
                            .from(UserFollowings::Table, UserFollowings::FolloweeId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Followers are looked up by followee
        manager
            .create_index(
                Index::create()
                    .name("idx_user_followings_followee")
                    .table(UserFollowings::Table)
                    .col(UserFollowings::FolloweeId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserFollowings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserFollowings {
    Table,
    FollowerId,
    FolloweeId,
}
