use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// Who wrote a message in a case's conversation thread.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Serialize, DeriveActiveEnum, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "sender_type")]
pub enum SenderType {
    #[sea_orm(string_value = "employee")]
    Employee,
    #[sea_orm(string_value = "hr_manager")]
    HrManager,
    #[sea_orm(string_value = "system")]
    System,
}

impl SenderType {
    /// Name recorded when the caller doesn't supply one.
    pub fn default_name(&self) -> &'static str {
        match self {
            SenderType::Employee => "Anonymous",
            SenderType::HrManager => "HR Manager",
            SenderType::System => "System",
        }
    }
}

impl std::fmt::Display for SenderType {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SenderType::Employee => write!(fmt, "employee"),
            SenderType::HrManager => write!(fmt, "hr_manager"),
            SenderType::System => write!(fmt, "system"),
        }
    }
}

impl FromStr for SenderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employee" => Ok(SenderType::Employee),
            "hr_manager" => Ok(SenderType::HrManager),
            "system" => Ok(SenderType::System),
            other => Err(format!("Invalid sender type: {other}")),
        }
    }
}
