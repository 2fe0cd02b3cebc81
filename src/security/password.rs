use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Argon2Config {
    pub memory_cost_kib: u32,
    pub time_cost: u32,
    pub parallelism: u32,
    pub output_length: usize,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost_kib: 65536,
            time_cost: 3,
            parallelism: 4,
            output_length: 32,
        }
    }
}

impl Argon2Config {
    pub fn low_memory() -> Self {
        Self {
            memory_cost_kib: 8192,
            time_cost: 2,
            parallelism: 1,
            output_length: 32,
        }
    }
}

pub struct SecretHasher {
    argon2: Argon2<'static>,
}

impl SecretHasher {
    pub fn new(config: Argon2Config) -> Result<Self> {
        let params = Params::new(
            config.memory_cost_kib,
            config.time_cost,
            config.parallelism,
            Some(config.output_length),
        )
        .map_err(|e| anyhow!("Invalid Argon2 parameters: {e}"))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(Argon2Config::default())
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("Failed to hash password: {e}"))?;

        Ok(hash.to_string())
    }

    /// Parameters are read from the PHC string, so hashes made with other costs still verify.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| anyhow!("Invalid password hash format: {e}"))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow!("Password verification failed: {e}")),
        }
    }

    pub fn needs_rehash(&self, hash: &str) -> Result<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| anyhow!("Invalid password hash format: {e}"))?;

        if parsed_hash.algorithm != argon2::ARGON2ID_IDENT {
            return Ok(true);
        }

        if let Some(m_param) = parsed_hash.params.get_str("m") {
            if let Ok(memory) = m_param.parse::<u32>() {
                if memory < self.argon2.params().m_cost() {
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    SecretHasher::with_defaults()?.hash(password)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    SecretHasher::with_defaults()?.verify(password, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = SecretHasher::new(Argon2Config::low_memory()).expect("Failed to create hasher");
        let hash = hasher.hash("s3nha-do-portal").expect("Failed to hash");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("s3nha-do-portal", &hash).expect("Verify failed"));
        assert!(!hasher.verify("WrongPassword", &hash).expect("Verify failed"));
    }

    #[test]
    fn test_verify_uses_hash_parameters() {
        let weak = SecretHasher::new(Argon2Config::low_memory()).expect("Failed to create hasher");
        let hash = weak.hash("s3nha").expect("Failed to hash");

        assert!(verify_password("s3nha", &hash).expect("Verify failed"));
    }

    #[test]
    fn test_invalid_hash_format() {
        let hasher = SecretHasher::new(Argon2Config::low_memory()).expect("Failed to create hasher");
        assert!(hasher.verify("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_needs_rehash_for_weaker_params() {
        let weak = SecretHasher::new(Argon2Config::low_memory()).expect("Failed to create hasher");
        let strong = SecretHasher::with_defaults().expect("Failed to create hasher");
        let hash = weak.hash("s3nha").expect("Failed to hash");

        assert!(strong.needs_rehash(&hash).expect("Check failed"));
        assert!(!weak.needs_rehash(&hash).expect("Check failed"));
    }
}
