//! Accounts module — user/profile management with PIN authentication.
//!
//! # Resources
//!
//! - **User** — identity with a sequential 7-digit id, a role, and a hashed PIN
//! - **Profile** — the person behind a user (name, phone, email, ...)
//!
//! Users and profiles are created together in one transaction; login issues
//! JWT bearer tokens; endpoints are gated by role sets resolved from the
//! authoritative user row, never from token claims alone.
//!
//! # Usage
//!
//! ```ignore
//! use accounts::{AccountsModule, service::AccountsConfig};
//!
//! let module = AccountsModule::new(sql, kv, AccountsConfig::default())?;
//! let router = module.routes(); // Mount under /accounts
//! ```

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use roster_core::Module;

use crate::service::{AccountsConfig, AccountsService};

/// Accounts module implementing the Module trait.
///
/// Holds the AccountsService and provides HTTP routes for all endpoints.
pub struct AccountsModule {
    service: Arc<AccountsService>,
}

impl AccountsModule {
    /// Create a new AccountsModule.
    pub fn new(
        sql: Arc<dyn roster_sql::SQLStore>,
        kv: Arc<dyn roster_kv::KVStore>,
        config: AccountsConfig,
    ) -> Result<Self, roster_core::ServiceError> {
        let service = AccountsService::new(sql, kv, config)
            .map_err(roster_core::ServiceError::from)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying AccountsService.
    pub fn service(&self) -> &Arc<AccountsService> {
        &self.service
    }
}

impl Module for AccountsModule {
    fn name(&self) -> &str {
        "accounts"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
