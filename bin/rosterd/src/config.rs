//! Server configuration loaded from a TOML context file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// HS256 signing secret shared by access and refresh tokens.
    pub secret: String,
    #[serde(default = "default_access_ttl")]
    pub access_ttl_secs: i64,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the SQLite and redb files.
    pub data_dir: String,
}

/// First-start super_admin account. The PIN is stored pre-hashed (argon2
/// PHC string) so the plaintext never lives in a config file.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    pub admin_email: String,
    pub admin_pin_hash: String,
}

fn default_access_ttl() -> i64 {
    3600 // 60 min
}

fn default_refresh_ttl() -> i64 {
    604800 // 7 days
}

impl ServerConfig {
    /// Resolve a context name or path to a config file path.
    ///
    /// A bare name maps to `/etc/roster/<name>.toml`; anything containing
    /// `/` or `.` is treated as a path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/roster/{}.toml", name_or_path))
        }
    }

    /// Load and parse the config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read config {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&text)
            .map_err(|e| anyhow::anyhow!("cannot parse config {}: {}", path.display(), e))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            ServerConfig::resolve_path("prod"),
            PathBuf::from("/etc/roster/prod.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./local.toml"),
            PathBuf::from("./local.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("/srv/roster.toml"),
            PathBuf::from("/srv/roster.toml")
        );
    }

    #[test]
    fn test_load_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        write!(
            file,
            r#"
[jwt]
secret = "s3cret"

[storage]
data_dir = "/var/lib/roster"

[bootstrap]
admin_email = "root@example.com"
admin_pin_hash = "$argon2id$v=19$m=19456,t=2,p=1$abc$def"
"#
        )
        .unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.jwt.secret, "s3cret");
        assert_eq!(config.jwt.access_ttl_secs, 3600);
        assert_eq!(config.jwt.refresh_ttl_secs, 604800);
        assert_eq!(config.storage.data_dir, "/var/lib/roster");
    }
}
