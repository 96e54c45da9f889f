// Password hashing.
//
// scrypt (N=16384, r=16, p=1, dkLen=64) with a random 16-byte salt.
// Output format: "hex(salt):hex(key)". Verification runs the same
// derivation and compares in constant time.

use rand::RngCore;
use scrypt::{scrypt, Params};
use subtle::ConstantTimeEq;

use notekeep_core::error::NotekeepError;

/// Hash a password, returning `salt:key` with both parts hex-encoded.
pub fn hash_password(password: &str) -> Result<String, NotekeepError> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt_hex = hex::encode(salt_bytes);

    let key = generate_key(password, &salt_hex)?;
    Ok(format!("{}:{}", salt_hex, hex::encode(key)))
}

/// Verify a password against a hash produced by `hash_password`.
pub fn verify_password(hash: &str, password: &str) -> Result<bool, NotekeepError> {
    let (salt, key_hex) = hash
        .split_once(':')
        .ok_or_else(|| NotekeepError::Crypto("invalid password hash format".into()))?;

    let expected_key = hex::decode(key_hex)
        .map_err(|e| NotekeepError::Crypto(format!("invalid hex in password hash: {e}")))?;

    let derived_key = generate_key(password, salt)?;
    Ok(constant_time_equal(&derived_key, &expected_key))
}

/// Compare two byte slices in constant time.
pub fn constant_time_equal(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Derive a 64-byte key using scrypt. N=16384 (log2 = 14), r=16, p=1.
fn generate_key(password: &str, salt: &str) -> Result<Vec<u8>, NotekeepError> {
    let params = Params::new(14, 16, 1, 64)
        .map_err(|e| NotekeepError::Crypto(format!("invalid scrypt params: {e}")))?;

    let mut output = vec![0u8; 64];
    scrypt(password.as_bytes(), salt.as_bytes(), &params, &mut output)
        .map_err(|e| NotekeepError::Crypto(format!("scrypt failed: {e}")))?;

    Ok(output)
}
