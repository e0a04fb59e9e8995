//! Human-presentable confirmation codes for cases.

use entity_api::case::CONFIRMATION_CODE_LEN;
use rand::distributions::Uniform;
use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Ten random uppercase alphanumerics. Uniqueness is enforced by the store, not here.
pub fn generate_confirmation_code() -> String {
    let mut rng = rand::thread_rng();
    let index = Uniform::from(0..ALPHABET.len());

    (0..CONFIRMATION_CODE_LEN)
        .map(|_| ALPHABET[rng.sample(index)] as char)
        .collect()
}
