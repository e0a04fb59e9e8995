pub use entity_api::hr_user::{authenticate, AuthSession, Backend, Credentials};
pub use entity_api::hr_users::Model;
