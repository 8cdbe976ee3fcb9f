pub mod changer;
pub mod credential_store;
pub mod hashing;
pub mod policy;
pub mod verifier;

pub use changer::{Argon2PasswordChanger, ChangePasswordError, PasswordChanger};
pub use credential_store::{CredentialStore, CredentialStoreError};
pub use hashing::{hash_password, verify_password};
pub use policy::{PasswordPolicy, PasswordPolicyViolation};
pub use verifier::{Argon2PasswordVerifier, PasswordVerifier, VerifyPasswordError};
