// Crypto primitives: the bearer-token service, password hashing, and
// random state generation.

pub mod jwt;
pub mod password;
pub mod random;
