//! SeaORM Entity for the hr_users table.
//! HR dashboard accounts; passwords are stored as password-auth (argon2) hashes.

use crate::roles::Role;
use crate::Id;
use axum_login::AuthUser;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::hr_users::Model)]
#[sea_orm(schema_name = "feedback_platform", table_name = "hr_users")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    /// Stored trimmed and lowercased; unique
    #[sea_orm(unique)]
    pub email: String,

    pub name: String,

    pub role: Role,

    #[serde(skip_serializing)]
    pub password: String,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl AuthUser for Model {
    type Id = Id;

    fn id(&self) -> Self::Id {
        self.id
    }

    // Changing the password invalidates every existing session for the account.
    fn session_auth_hash(&self) -> &[u8] {
        self.password.as_bytes()
    }
}
