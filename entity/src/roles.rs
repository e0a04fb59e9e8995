use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Access level of an HR dashboard account.
#[derive(
    Debug, Clone, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "hr_role")]
pub enum Role {
    #[sea_orm(string_value = "hr_manager")]
    #[default]
    HrManager,
    #[sea_orm(string_value = "hr_admin")]
    HrAdmin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::HrManager => write!(fmt, "hr_manager"),
            Role::HrAdmin => write!(fmt, "hr_admin"),
        }
    }
}
