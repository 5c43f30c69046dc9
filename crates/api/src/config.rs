//! Process configuration, read once from the environment at startup and
//! passed explicitly from there on.

use std::path::PathBuf;

use pressbill_billing::BillingConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen address, e.g. `0.0.0.0:8080`.
    pub bind_addr: String,
    /// SQLite database file. `None` runs on the in-memory store.
    pub database_path: Option<PathBuf>,
    /// Where startup backups of the database file go, when set.
    pub backup_dir: Option<PathBuf>,
    /// How many backups to retain.
    pub backup_keep: usize,
    /// Where daily activity JSONL files go, when set.
    pub activity_dir: Option<PathBuf>,
    pub billing: BillingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            database_path: None,
            backup_dir: None,
            backup_keep: 10,
            activity_dir: None,
            billing: BillingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from `PRESSBILL_*` environment variables, falling
    /// back to defaults for anything unset. Invalid values fail startup.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("PRESSBILL_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(path) = std::env::var("PRESSBILL_DB") {
            config.database_path = Some(PathBuf::from(path));
        }
        if let Ok(dir) = std::env::var("PRESSBILL_BACKUP_DIR") {
            config.backup_dir = Some(PathBuf::from(dir));
        }
        if let Ok(keep) = std::env::var("PRESSBILL_BACKUP_KEEP") {
            config.backup_keep = keep
                .parse()
                .map_err(|_| anyhow::anyhow!("PRESSBILL_BACKUP_KEEP must be a number"))?;
        }
        if let Ok(dir) = std::env::var("PRESSBILL_ACTIVITY_DIR") {
            config.activity_dir = Some(PathBuf::from(dir));
        }
        if let Ok(prefix) = std::env::var("PRESSBILL_INVOICE_PREFIX") {
            config.billing.number_prefix = prefix;
        }
        if let Ok(tax) = std::env::var("PRESSBILL_DEFAULT_TAX") {
            config.billing.default_tax_percent = tax
                .parse()
                .map_err(|_| anyhow::anyhow!("PRESSBILL_DEFAULT_TAX must be a decimal"))?;
        }
        if let Ok(policy) = std::env::var("PRESSBILL_TOTALS_POLICY") {
            config.billing.totals_policy = policy
                .parse()
                .map_err(|e| anyhow::anyhow!("PRESSBILL_TOTALS_POLICY: {e}"))?;
        }

        Ok(config)
    }
}
