use super::error::Error;
use async_trait::async_trait;
use axum_login::{AuthnBackend, UserId};
use chrono::Utc;

use entity::hr_users::{ActiveModel, Column, Entity, Model};
use entity::roles::Role;
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ConnectionTrait, DatabaseConnection, Set};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

/// Emails are compared trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn create(
    db: &impl ConnectionTrait,
    email: &str,
    name: &str,
    role: Role,
    password: &str,
) -> Result<Model, Error> {
    let email = normalize_email(email);
    if email.is_empty() || !email.contains('@') {
        return Err(Error::validation("A valid email address is required"));
    }
    if password.is_empty() {
        return Err(Error::validation("Password is required"));
    }
    debug!("Creating HR user {email}");

    let now = Utc::now();
    let active_model = ActiveModel {
        email: Set(email),
        name: Set(name.trim().to_string()),
        role: Set(role),
        password: Set(generate_hash(password)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}

pub async fn find_by_email(db: &impl ConnectionTrait, email: &str) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::Email.eq(normalize_email(email)))
        .one(db)
        .await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

pub fn generate_hash(password: &str) -> String {
    password_auth::generate_hash(password)
}

/// Checks an email/password pair against the stored argon2 hash.
///
/// Unknown accounts and wrong passwords produce the same `RecordUnauthenticated` error.
pub async fn authenticate(
    db: &impl ConnectionTrait,
    email: &str,
    password: &str,
) -> Result<Model, Error> {
    let user = find_by_email(db, email).await?.ok_or_else(|| {
        info!("Login attempt for unknown HR account");
        Error::invalid_credentials()
    })?;

    match password_auth::verify_password(password, &user.password) {
        Ok(_) => Ok(user),
        Err(_) => {
            info!("Login attempt with wrong password for {}", user.email);
            Err(Error::invalid_credentials())
        }
    }
}

#[derive(Debug, Clone)]
pub struct Backend {
    db: Arc<DatabaseConnection>,
}

#[derive(Debug, Clone, ToSchema, IntoParams, Deserialize)]
#[schema(as = domain::hr_user::Credentials)] // OpenAPI schema
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

impl Backend {
    pub fn new(db: &Arc<DatabaseConnection>) -> Self {
        Self {
            // Arc is cloned, but the source DatabaseConnection refers to the same instance
            // as the one passed in to new() (see the Arc documentation for more info)
            db: Arc::clone(db),
        }
    }
}

#[async_trait]
impl AuthnBackend for Backend {
    type User = Model;
    type Credentials = Credentials;
    type Error = Error;

    async fn authenticate(
        &self,
        creds: Self::Credentials,
    ) -> Result<Option<Self::User>, Self::Error> {
        authenticate(self.db.as_ref(), &creds.email, &creds.password)
            .await
            .map(Some)
    }

    async fn get_user(&self, user_id: &UserId<Self>) -> Result<Option<Self::User>, Self::Error> {
        Ok(Entity::find_by_id(*user_id).one(self.db.as_ref()).await?)
    }
}

pub type AuthSession = axum_login::AuthSession<Backend>;
