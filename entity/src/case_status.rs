use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// Where a case is in HR's triage workflow. Any status may be set by HR at any time,
/// but a closed case no longer accepts new messages.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    EnumIter,
    Deserialize,
    Default,
    Serialize,
    DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "case_status")]
pub enum CaseStatus {
    #[sea_orm(string_value = "open")]
    #[default]
    Open,
    #[sea_orm(string_value = "investigating")]
    Investigating,
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl CaseStatus {
    pub fn accepts_messages(&self) -> bool {
        *self != CaseStatus::Closed
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseStatus::Open => write!(fmt, "open"),
            CaseStatus::Investigating => write!(fmt, "investigating"),
            CaseStatus::Closed => write!(fmt, "closed"),
        }
    }
}

impl FromStr for CaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(CaseStatus::Open),
            "investigating" => Ok(CaseStatus::Investigating),
            "closed" => Ok(CaseStatus::Closed),
            other => Err(format!("Invalid case status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_closed_cases_refuse_messages() {
        assert!(CaseStatus::Open.accepts_messages());
        assert!(CaseStatus::Investigating.accepts_messages());
        assert!(!CaseStatus::Closed.accepts_messages());
    }

    #[test]
    fn parses_status_names() {
        assert_eq!(" Closed ".parse::<CaseStatus>(), Ok(CaseStatus::Closed));
        assert!("resolved".parse::<CaseStatus>().is_err());
    }
}
