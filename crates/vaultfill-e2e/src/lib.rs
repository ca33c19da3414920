//! End-to-end test utilities for vaultfill
//!
//! This crate provides a fake `vault` executable so the real CLI backend can be
//! exercised without a running Vault server.

#[cfg(unix)]
pub mod mock_vault;

#[cfg(unix)]
pub use mock_vault::MockVault;
