//! Staff PIN hashing and lookup.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use haven_core::staff::Staff;
use rand_core::OsRng;

use crate::error::ApiError;

const MIN_PIN_LEN: usize = 4;

/// Hash `pin` into an argon2 PHC string. PINs must be at least four ASCII
/// digits.
pub fn hash_pin(pin: &str) -> Result<String, ApiError> {
  if pin.len() < MIN_PIN_LEN || !pin.chars().all(|c| c.is_ascii_digit()) {
    return Err(ApiError::BadRequest(format!(
      "pin must be at least {MIN_PIN_LEN} digits"
    )));
  }
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(pin.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// Return the first staff member whose stored hash matches `pin`.
pub fn match_pin<'a>(pin: &str, candidates: &'a [Staff]) -> Option<&'a Staff> {
  candidates.iter().find(|staff| {
    staff
      .pin_hash
      .as_deref()
      .and_then(|h| PasswordHash::new(h).ok())
      .is_some_and(|parsed| {
        Argon2::default()
          .verify_password(pin.as_bytes(), &parsed)
          .is_ok()
      })
  })
}

/// Hash a new PIN for one staff member on the blocking pool. `others` are
/// the remaining staff rows with a PIN set; a PIN that already verifies
/// against one of them is rejected, since the edge endpoints identify staff
/// by PIN alone.
pub async fn hash_new_pin(code: String, others: Vec<Staff>) -> Result<String, ApiError> {
  tokio::task::spawn_blocking(move || {
    let hash = hash_pin(&code)?;
    if match_pin(&code, &others).is_some() {
      return Err(ApiError::Conflict("pin is already in use".to_owned()));
    }
    Ok(hash)
  })
  .await
  .map_err(|e| ApiError::Internal(format!("pin hashing panicked: {e}")))?
}
