//! First-start checks and super_admin creation.

use accounts::service::AccountsService;
use tracing::info;

use crate::config::ServerConfig;

/// Verify server configuration is ready for use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.jwt.secret.is_empty() {
        anyhow::bail!("JWT secret is empty in configuration.");
    }
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    if config.bootstrap.admin_pin_hash.is_empty() {
        anyhow::bail!(
            "No admin PIN hash found in configuration.\n\
             Generate one and set bootstrap.admin_pin_hash before starting."
        );
    }
    if !config.bootstrap.admin_pin_hash.starts_with("$argon2") {
        anyhow::bail!("bootstrap.admin_pin_hash is not an argon2 PHC string.");
    }
    Ok(())
}

/// Ensure a live super_admin exists, creating one from the configured
/// pre-hashed PIN on first start.
pub fn ensure_super_admin(
    svc: &AccountsService,
    config: &ServerConfig,
) -> anyhow::Result<()> {
    match svc.ensure_super_admin(
        &config.bootstrap.admin_email,
        &config.bootstrap.admin_pin_hash,
    ) {
        Ok(Some(user_id)) => {
            info!(user_id = %user_id, "created bootstrap super_admin");
            Ok(())
        }
        Ok(None) => {
            info!("super_admin already exists");
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("bootstrap failed: {}", e)),
    }
}
