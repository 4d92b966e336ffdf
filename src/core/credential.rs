use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::Rng;

use crate::common::{ErrorKind, Result};

/// Argon2id cost parameters used when hashing new passwords.
///
/// Verification always uses the parameters recorded in the stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashParams {
    fn hasher(&self) -> Result<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|err| ErrorKind::PasswordHash(err.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hash `password` into a PHC string with a fresh random salt.
pub fn hash_password(password: &str, params: &HashParams) -> crate::Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let phc = params
        .hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| ErrorKind::PasswordHash(err.to_string()))
        .map_err(crate::common::Error::from)?
        .to_string();
    Ok(phc)
}

pub(crate) fn verify_password(phc: &str, password: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Hash of a random secret with the cost recorded in `reference`.
///
/// Unknown emails are verified against it, so they take as long to reject as
/// a wrong password.
pub(crate) fn decoy_hash(reference: Option<&str>) -> Result<String> {
    let params = reference
        .and_then(|phc| PasswordHash::new(phc).ok())
        .and_then(|parsed| Params::try_from(&parsed).ok())
        .map(|params| HashParams {
            memory_kib: params.m_cost(),
            iterations: params.t_cost(),
            parallelism: params.p_cost(),
        })
        .unwrap_or_default();

    let secret: [u8; 32] = rand::thread_rng().gen();
    let salt = SaltString::generate(&mut rand::thread_rng());
    let phc = params
        .hasher()?
        .hash_password(&secret, &salt)
        .map_err(|err| ErrorKind::PasswordHash(err.to_string()))?
        .to_string();
    Ok(phc)
}

/// Reject stored hashes that could never verify.
pub(crate) fn validate_hash(phc: &str) -> Result<()> {
    PasswordHash::new(phc)
        .map(|_| ())
        .map_err(|err| ErrorKind::PasswordHash(err.to_string()).into())
}

#[cfg(test)]
pub(crate) fn light_params() -> HashParams {
    HashParams {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    }
}
