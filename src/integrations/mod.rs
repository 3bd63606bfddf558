//! Auxiliary integrations used by extensions next to the platform API:
//! Azure Key Vault secret access and Airtable error wrapping.

pub mod airtable;
pub mod key_vault;

pub use airtable::{AirTableError, AirTableResult};
pub use key_vault::{KeyVault, KeyVaultError, KeyVaultResult};
