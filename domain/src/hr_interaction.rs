use crate::error::Error;
use entity::sender_type::SenderType;
use entity::Id;
use log::*;
use sea_orm::{DatabaseConnection, TransactionTrait};
use service::config::Config;

pub use entity_api::hr_interaction::find_by_case_id;
pub use entity_api::hr_interactions::Model;

pub const CLOSED_CASE_MESSAGE: &str = "This case is closed and no longer accepts messages";

/// Appends a message to an open case's thread. Closed cases refuse new messages.
pub async fn send_message(
    db: &DatabaseConnection,
    case_id: Id,
    sender_type: SenderType,
    sender_name: Option<&str>,
    message: &str,
) -> Result<Model, Error> {
    let txn = db.begin().await?;

    let case = entity_api::case::find_by_id(&txn, case_id).await?;
    if !case.status.accepts_messages() {
        info!(
            "Refusing {sender_type} message on closed case {}",
            case.confirmation_code
        );
        return Err(Error::invalid(CLOSED_CASE_MESSAGE));
    }

    let interaction =
        entity_api::hr_interaction::create(&txn, case.id, message, sender_type, sender_name)
            .await?;

    txn.commit().await?;
    Ok(interaction)
}

/// Anonymous employee follow-up on the case identified by its confirmation code.
pub async fn send_employee_message(
    db: &DatabaseConnection,
    config: &Config,
    confirmation_code: &str,
    message: &str,
) -> Result<Model, Error> {
    let case = crate::case::find_by_confirmation_code(db, config, confirmation_code).await?;
    send_message(db, case.id, SenderType::Employee, None, message).await
}
