mod password;

pub use password::{BCRYPT_COST, hash_password, verify_password};
