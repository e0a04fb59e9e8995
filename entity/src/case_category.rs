use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Fixed set of feedback categories assigned by the text classifier.
///
/// `CallAcknowledgment` marks the audit cases written for ACK number generation.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Hash, EnumIter, Deserialize, Serialize, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "case_category")]
pub enum CaseCategory {
    #[serde(rename = "Workplace Safety")]
    #[sea_orm(string_value = "Workplace Safety")]
    WorkplaceSafety,
    #[serde(rename = "Harassment")]
    #[sea_orm(string_value = "Harassment")]
    Harassment,
    #[serde(rename = "Discrimination")]
    #[sea_orm(string_value = "Discrimination")]
    Discrimination,
    #[serde(rename = "Policy Violation")]
    #[sea_orm(string_value = "Policy Violation")]
    PolicyViolation,
    #[serde(rename = "Work-Life Balance")]
    #[sea_orm(string_value = "Work-Life Balance")]
    WorkLifeBalance,
    #[serde(rename = "Workplace Environment")]
    #[sea_orm(string_value = "Workplace Environment")]
    WorkplaceEnvironment,
    #[serde(rename = "Benefits Inquiry")]
    #[sea_orm(string_value = "Benefits Inquiry")]
    BenefitsInquiry,
    #[serde(rename = "General Feedback")]
    #[sea_orm(string_value = "General Feedback")]
    GeneralFeedback,
    #[serde(rename = "Call Acknowledgment")]
    #[sea_orm(string_value = "Call Acknowledgment")]
    CallAcknowledgment,
}

impl CaseCategory {
    pub fn label(&self) -> &'static str {
        match self {
            CaseCategory::WorkplaceSafety => "Workplace Safety",
            CaseCategory::Harassment => "Harassment",
            CaseCategory::Discrimination => "Discrimination",
            CaseCategory::PolicyViolation => "Policy Violation",
            CaseCategory::WorkLifeBalance => "Work-Life Balance",
            CaseCategory::WorkplaceEnvironment => "Workplace Environment",
            CaseCategory::BenefitsInquiry => "Benefits Inquiry",
            CaseCategory::GeneralFeedback => "General Feedback",
            CaseCategory::CallAcknowledgment => "Call Acknowledgment",
        }
    }
}

impl std::fmt::Display for CaseCategory {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "{}", self.label())
    }
}
