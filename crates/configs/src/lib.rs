use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub blob_store: BlobStoreConfig,
    #[serde(default)]
    pub celebration: CelebrationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

/// Key-addressed object store holding uploaded message images.
#[derive(Debug, Clone, Deserialize)]
pub struct BlobStoreConfig {
    /// Base URL receiving `DELETE {endpoint}/{bucket}/{key}`.
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub bucket: String,
    /// Prefix of the public image URLs stored in messages. Keys are the remainder.
    #[serde(default)]
    pub public_base_url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_blob_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for BlobStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            bucket: String::new(),
            public_base_url: None,
            token: None,
            request_timeout_secs: default_blob_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CelebrationConfig {
    #[serde(default = "default_max_images")]
    pub max_images: usize,
}

impl Default for CelebrationConfig {
    fn default() -> Self {
        Self { max_images: default_max_images() }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_blob_timeout() -> u64 { 10 }
fn default_max_images() -> usize { 10 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

/// Like [`load_from_file`], but a missing file yields `None`.
/// Read errors other than not-found and parse errors still propagate.
pub fn load_if_present(path: &str) -> Result<Option<AppConfig>> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse(&content).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(anyhow!("cannot read {path}: {e}")),
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load from `CONFIG_PATH` when the file exists, otherwise start from defaults
    /// and let the environment fill in the blanks.
    pub fn load_and_validate() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_and_validate_from(&path)
    }

    pub fn load_and_validate_from(path: &str) -> Result<Self> {
        let mut cfg = load_if_present(path)?.unwrap_or_default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.database.normalize_from_env();
        self.database.validate()?;
        self.blob_store.normalize_from_env();
        self.blob_store.validate()?;
        self.celebration.validate()?;
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://") || lower.starts_with("sqlite:")) {
            return Err(anyhow!("database.url must start with postgres://, postgresql:// or sqlite:"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl BlobStoreConfig {
    pub fn normalize_from_env(&mut self) {
        if self.endpoint.trim().is_empty() {
            if let Ok(v) = std::env::var("BLOB_STORE_ENDPOINT") {
                self.endpoint = v;
            }
        }
        if self.bucket.trim().is_empty() {
            if let Ok(v) = std::env::var("BLOB_STORE_BUCKET") {
                self.bucket = v;
            }
        }
        if self.public_base_url.is_none() {
            self.public_base_url = std::env::var("BLOB_STORE_PUBLIC_URL").ok();
        }
        if self.token.is_none() {
            self.token = std::env::var("BLOB_STORE_TOKEN").ok();
        }
        self.endpoint = self.endpoint.trim_end_matches('/').to_string();
        self.bucket = self.bucket.trim_matches('/').to_string();
    }

    pub fn validate(&self) -> Result<()> {
        if !self.endpoint.is_empty() {
            let lower = self.endpoint.to_lowercase();
            if !(lower.starts_with("http://") || lower.starts_with("https://")) {
                return Err(anyhow!("blob_store.endpoint must start with http(s)"));
            }
        }
        if let Some(base) = &self.public_base_url {
            let lower = base.to_lowercase();
            if !(lower.starts_with("http://") || lower.starts_with("https://")) {
                return Err(anyhow!("blob_store.public_base_url must start with http(s)"));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("blob_store.request_timeout_secs must be positive"));
        }
        Ok(())
    }
}

impl CelebrationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_images == 0 {
            return Err(anyhow!("celebration.max_images must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.database.min_connections, 2);
        assert_eq!(cfg.blob_store.request_timeout_secs, 10);
        assert_eq!(cfg.celebration.max_images, 10);
    }

    #[test]
    fn parses_all_sections() {
        let cfg = parse(
            r#"
            [database]
            url = "postgres://u:p@localhost:5432/wedding"
            max_connections = 5
            min_connections = 1

            [blob_store]
            endpoint = "https://storage.example.com/"
            bucket = "/wedding-images/"
            public_base_url = "https://wedding-images.storage.example.com/"

            [celebration]
            max_images = 4
            "#,
        )
        .unwrap();
        assert_eq!(cfg.database.max_connections, 5);
        assert_eq!(cfg.celebration.max_images, 4);

        let mut blob = cfg.blob_store.clone();
        blob.normalize_from_env();
        assert_eq!(blob.endpoint, "https://storage.example.com");
        assert_eq!(blob.bucket, "wedding-images");
        assert!(blob.validate().is_ok());
    }

    #[test]
    fn database_validation_rejects_bad_values() {
        let mut db = DatabaseConfig { url: "mysql://localhost/x".into(), ..Default::default() };
        assert!(db.validate().is_err());

        db.url = "sqlite::memory:".into();
        assert!(db.validate().is_ok());

        db.min_connections = 0;
        assert!(db.validate().is_err());

        db.min_connections = 4;
        db.max_connections = 2;
        assert!(db.validate().is_err());
    }

    #[test]
    fn blob_store_rejects_non_http_endpoint() {
        let blob = BlobStoreConfig { endpoint: "ftp://files".into(), ..Default::default() };
        assert!(blob.validate().is_err());

        let blob = BlobStoreConfig { request_timeout_secs: 0, ..Default::default() };
        assert!(blob.validate().is_err());
    }

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", std::process::id(), name));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn malformed_file_is_an_error_not_defaults() {
        let path = write_temp(
            "bad-config.toml",
            r#"
            [database]
            url = "sqlite::memory:"

            [celebration]
            max_images = "three"
            "#,
        );
        let path = path.to_str().unwrap();
        assert!(load_if_present(path).is_err());
        assert!(AppConfig::load_and_validate_from(path).is_err());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_absent() {
        let path = std::env::temp_dir().join(format!("{}-no-such-config.toml", std::process::id()));
        assert!(load_if_present(path.to_str().unwrap()).unwrap().is_none());
    }

    #[test]
    fn present_file_is_loaded_and_validated() {
        let path = write_temp(
            "good-config.toml",
            r#"
            [database]
            url = "sqlite::memory:"

            [celebration]
            max_images = 3
            "#,
        );
        let path = path.to_str().unwrap();
        let cfg = AppConfig::load_and_validate_from(path).unwrap();
        assert_eq!(cfg.database.url, "sqlite::memory:");
        assert_eq!(cfg.celebration.max_images, 3);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn zero_image_limit_is_rejected() {
        assert!(CelebrationConfig { max_images: 0 }.validate().is_err());
        assert!(CelebrationConfig::default().validate().is_ok());
    }
}
