use super::user_following;
use sea_orm::entity::prelude::*;
use sea_orm::{sea_query::OnConflict, ActiveValue::Set, QueryOrder, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Represents a user account.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub email: Option<String>,
}

// Both directions of the followings relation go through `user_followings`,
// see `FollowingsLink` and `FollowersLink`.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// User -> users it follows.
pub struct FollowingsLink;

impl Linked for FollowingsLink {
    type FromEntity = Entity;
    type ToEntity = Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![
            user_following::Relation::Follower.def().rev(),
            user_following::Relation::Followee.def(),
        ]
    }
}

/// User -> users following it.
pub struct FollowersLink;

impl Linked for FollowersLink {
    type FromEntity = Entity;
    type ToEntity = Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![
            user_following::Relation::Followee.def().rev(),
            user_following::Relation::Follower.def(),
        ]
    }
}

impl Model {
    /// Users this user follows, ordered by id.
    pub async fn followings<C: ConnectionTrait>(&self, db: &C) -> Result<Vec<Model>, DbErr> {
        self.find_linked(FollowingsLink)
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    /// Users following this user, ordered by id.
    pub async fn followers<C: ConnectionTrait>(&self, db: &C) -> Result<Vec<Model>, DbErr> {
        self.find_linked(FollowersLink)
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    pub async fn is_following<C: ConnectionTrait>(&self, db: &C, followee_id: i32) -> Result<bool, DbErr> {
        Ok(user_following::Entity::find_by_id((self.id, followee_id))
            .one(db)
            .await?
            .is_some())
    }

    /// Starts following `followee_id`.
    ///
    /// Returns `false` when the pair already exists; the relation never holds
    /// the same pair twice, even when two follows of the same pair race.
    pub async fn follow<C: ConnectionTrait>(&self, db: &C, followee_id: i32) -> Result<bool, DbErr> {
        trace!("User {} follows {}", self.id, followee_id);
        let result = user_following::Entity::insert(user_following::ActiveModel {
            follower_id: Set(self.id),
            followee_id: Set(followee_id),
        })
        .on_conflict(
            OnConflict::columns([
                user_following::Column::FollowerId,
                user_following::Column::FolloweeId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await;

        match result {
            Ok(0) | Err(DbErr::RecordNotInserted) => {
                debug!("User {} already follows {}", self.id, followee_id);
                Ok(false)
            }
            Ok(_) => Ok(true),
            Err(e) => Err(e),
        }
    }

    /// Stops following `followee_id`. Returns `false` when there was nothing to remove.
    pub async fn unfollow<C: ConnectionTrait>(&self, db: &C, followee_id: i32) -> Result<bool, DbErr> {
        trace!("User {} unfollows {}", self.id, followee_id);
        let result = user_following::Entity::delete_by_id((self.id, followee_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Replaces the whole followings set with `followee_ids`.
    pub async fn set_followings(&self, db: &DatabaseConnection, followee_ids: &[i32]) -> Result<(), DbErr> {
        let wanted: BTreeSet<i32> = followee_ids.iter().copied().collect();

        let txn = db.begin().await?;
        let current: BTreeSet<i32> = user_following::Entity::find()
            .filter(user_following::Column::FollowerId.eq(self.id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|row| row.followee_id)
            .collect();

        let removed: Vec<i32> = current.difference(&wanted).copied().collect();
        if !removed.is_empty() {
            user_following::Entity::delete_many()
                .filter(user_following::Column::FollowerId.eq(self.id))
                .filter(user_following::Column::FolloweeId.is_in(removed.clone()))
                .exec(&txn)
                .await?;
        }

        let added: Vec<user_following::ActiveModel> = wanted
            .difference(&current)
            .map(|followee_id| user_following::ActiveModel {
                follower_id: Set(self.id),
                followee_id: Set(*followee_id),
            })
            .collect();
        let added_count = added.len();
        if !added.is_empty() {
            user_following::Entity::insert_many(added)
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;
        debug!(
            "User {} followings replaced: {} added, {} removed",
            self.id,
            added_count,
            removed.len()
        );
        Ok(())
    }
}
