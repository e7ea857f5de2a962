use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
};

use crate::db::entities::user;

/// Inserts a new user. Uniqueness of username and email is left to the
/// table constraints; callers map the violation.
pub async fn create_user<C>(
    conn: &C,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<user::Model, DbErr>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let new_user = user::ActiveModel {
        username: Set(username.to_owned()),
        email: Set(email.to_owned()),
        password_hash: Set(password_hash.to_owned()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default() // id will be set by the database
    };
    new_user.insert(conn).await
}

pub async fn get_user_by_username<C>(conn: &C, username: &str) -> Result<Option<user::Model>, DbErr>
where
    C: ConnectionTrait,
{
    user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(conn)
        .await
}

pub async fn get_user_by_id<C>(conn: &C, user_id: i32) -> Result<Option<user::Model>, DbErr>
where
    C: ConnectionTrait,
{
    user::Entity::find_by_id(user_id).one(conn).await
}
