use crate::{
    entities::{profile, student, user},
    error::ServiceError,
};
use chrono::{NaiveDate, Utc};
use log::{info, warn};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, TransactionTrait, sea_query::Expr,
};
use std::collections::HashSet;

/// Permissions held by every teacher
pub const TEACHER_PERMISSIONS: [&str; 9] = [
    "courses.add_course",
    "courses.change_course",
    "courses.delete_course",
    "courses.add_module",
    "courses.change_module",
    "courses.delete_module",
    "courses.add_content",
    "courses.change_content",
    "courses.delete_content",
];

/// Permissions held by every student
pub const STUDENT_PERMISSIONS: [&str; 2] = ["students.take_quiz", "courses.add_review"];

/// Account rules that are a product decision rather than a schema constraint
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountPolicy {
    /// Reject new accounts whose email is already registered
    pub unique_email: bool,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_student: bool,
    pub is_teacher: bool,
}

#[derive(Debug, Clone)]
pub struct UserChanges {
    pub first_name: String,
    pub last_name: String,
}

pub struct AccountService;

impl AccountService {
    /// Creates a user, its profile and, for students, its student row in one transaction
    pub async fn create_account(
        db: &DatabaseConnection,
        account: NewAccount,
        policy: AccountPolicy,
    ) -> Result<(user::Model, profile::Model), ServiceError> {
        let txn = db.begin().await?;

        let username_taken = user::Entity::find()
            .filter(user::Column::Username.eq(account.username.as_str()))
            .one(&txn)
            .await?
            .is_some();
        if username_taken {
            return Err(ServiceError::invalid(
                "username",
                "A user with that username already exists.",
            ));
        }

        if policy.unique_email {
            let email_taken = user::Entity::find()
                .filter(user::Column::Email.eq(account.email.as_str()))
                .one(&txn)
                .await?
                .is_some();
            if email_taken {
                return Err(ServiceError::invalid("email", "Email already exist"));
            }
        }

        let user = user::ActiveModel {
            username: Set(account.username),
            email: Set(account.email),
            first_name: Set(account.first_name),
            last_name: Set(account.last_name),
            is_student: Set(account.is_student),
            is_teacher: Set(account.is_teacher),
            is_active: Set(true),
            date_joined: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let profile = Self::insert_profile(&txn, user.id).await?;

        if user.is_student {
            student::ActiveModel {
                user_id: Set(user.id),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        info!("Created account {} ({})", user.id, user.username);

        Ok((user, profile))
    }

    async fn insert_profile<C: ConnectionTrait>(
        conn: &C,
        user_id: i32,
    ) -> Result<profile::Model, DbErr> {
        profile::ActiveModel {
            user_id: Set(user_id),
            award_points: Set(0),
            location: Set(String::new()),
            birthdate: Set(None),
            ..Default::default()
        }
        .insert(conn)
        .await
    }

    /// Saves user changes, then makes sure the user has its profile
    pub async fn save_user(
        db: &DatabaseConnection,
        user_id: i32,
        changes: UserChanges,
    ) -> Result<(user::Model, profile::Model), ServiceError> {
        let txn = db.begin().await?;

        let existing = user::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound("user"))?;

        let mut active: user::ActiveModel = existing.into();
        active.first_name = Set(changes.first_name);
        active.last_name = Set(changes.last_name);
        let user = active.update(&txn).await?;

        let profile = Self::ensure_profile(&txn, user.id).await?;
        txn.commit().await?;

        Ok((user, profile))
    }

    /// The user's profile, created on the spot if it is missing
    pub async fn ensure_profile<C: ConnectionTrait>(
        conn: &C,
        user_id: i32,
    ) -> Result<profile::Model, DbErr> {
        let existing = profile::Entity::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(conn)
            .await?;

        match existing {
            Some(profile) => Ok(profile),
            None => {
                warn!("User {user_id} had no profile, creating one");
                Self::insert_profile(conn, user_id).await
            }
        }
    }

    pub async fn get(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Option<(user::Model, Option<profile::Model>)>, DbErr> {
        user::Entity::find_by_id(user_id)
            .find_also_related(profile::Entity)
            .one(db)
            .await
    }

    pub async fn update_profile(
        db: &DatabaseConnection,
        user_id: i32,
        location: String,
        birthdate: Option<NaiveDate>,
    ) -> Result<profile::Model, DbErr> {
        let txn = db.begin().await?;
        let existing = Self::ensure_profile(&txn, user_id).await?;

        let mut active: profile::ActiveModel = existing.into();
        active.location = Set(location);
        active.birthdate = Set(birthdate);
        let profile = active.update(&txn).await?;
        txn.commit().await?;

        Ok(profile)
    }

    /// Adds points to the user's running total
    pub async fn award_points<C: ConnectionTrait>(
        conn: &C,
        user_id: i32,
        points: i32,
    ) -> Result<(), DbErr> {
        Self::ensure_profile(conn, user_id).await?;

        profile::Entity::update_many()
            .col_expr(
                profile::Column::AwardPoints,
                Expr::col(profile::Column::AwardPoints).add(points),
            )
            .filter(profile::Column::UserId.eq(user_id))
            .exec(conn)
            .await?;

        info!("Awarded {points} points to user {user_id}");
        Ok(())
    }

    /// Permissions implied by the user's role flags
    pub fn permissions(user: &user::Model) -> HashSet<String> {
        let mut perms = HashSet::new();
        if user.is_teacher {
            perms.extend(TEACHER_PERMISSIONS.iter().map(|p| p.to_string()));
        }
        if user.is_student {
            perms.extend(STUDENT_PERMISSIONS.iter().map(|p| p.to_string()));
        }
        perms
    }
}
