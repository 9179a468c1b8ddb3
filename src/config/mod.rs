use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_primary_table")]
    pub primary_table: String,
    #[serde(default = "default_audit_table")]
    pub audit_table: String,
    #[serde(default = "default_users_table")]
    pub users_table: String,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_remote_timeout")]
    pub remote_timeout_ms: u64,
    #[serde(default = "default_fallback_staff_email")]
    pub fallback_staff_email: String,
    #[serde(default)]
    pub fields: FieldRules,
    /// Canonical headers used when a business table has to be provisioned.
    #[serde(default = "default_tables")]
    pub tables: BTreeMap<String, Vec<String>>,
    /// Columns appended to a table's header before any write touches it.
    #[serde(default = "default_required_columns")]
    pub required_columns: BTreeMap<String, Vec<String>>,
}

/// Field-name policy consumed by the normalizer and the upsert defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldRules {
    pub name_field: String,
    pub phone_field: String,
    pub date_received_field: String,
    pub staff_email_field: String,
    pub whatsapp_field: String,
    pub date_fields: Vec<String>,
    pub time_fields: Vec<String>,
    pub email_fields: Vec<String>,
    pub title_fields: Vec<String>,
    pub trimmed_fields: Vec<String>,
    pub acronyms: Vec<String>,
}

const DATE_RECEIVED: &str = "DATE RECEIVED";
const NEXT_FOLLOW_UP: &str = "Next Follow-up Date";
const FOLLOW_UP_TIME: &str = "Follow-up Time (HH:MM)";
const CUSTOMER_NAME: &str = "Customer Name";
const CONTACT_NUMBER: &str = "Contact Number";
const STAFF_EMAIL: &str = "Staff Email";
const CUSTOMER_EMAIL: &str = "Customer Email";
const WHATSAPP: &str = "Customer WhatsApp (+91XXXXXXXXXX)";
const SALE_VALUE: &str = "SALE VALUE";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for FieldRules {
    fn default() -> Self {
        Self {
            name_field: CUSTOMER_NAME.to_string(),
            phone_field: CONTACT_NUMBER.to_string(),
            date_received_field: DATE_RECEIVED.to_string(),
            staff_email_field: STAFF_EMAIL.to_string(),
            whatsapp_field: WHATSAPP.to_string(),
            date_fields: strings(&[DATE_RECEIVED, NEXT_FOLLOW_UP]),
            time_fields: strings(&[FOLLOW_UP_TIME]),
            email_fields: strings(&[STAFF_EMAIL, CUSTOMER_EMAIL]),
            title_fields: strings(&[
                CUSTOMER_NAME,
                "Address/Location",
                "Lead Source",
                "Lead Status",
                "Product Type",
                "Delivery Status",
                "Complaint Status",
                "Complaint Registered By",
                "LEAD Sales Executive",
                "Delivery Sales Executive",
                "Delivery Assigned To",
                "Complaint/Service Assigned To",
            ]),
            trimmed_fields: strings(&[WHATSAPP]),
            acronyms: strings(&["TV", "GB", "X2", "X3"]),
        }
    }
}

fn default_primary_table() -> String {
    "CRM".to_string()
}
fn default_audit_table() -> String {
    "History Log".to_string()
}
fn default_users_table() -> String {
    "Users".to_string()
}
fn default_cache_ttl() -> u64 {
    60
}
fn default_remote_timeout() -> u64 {
    5000
}
fn default_fallback_staff_email() -> String {
    "staff@example.com".to_string()
}

fn default_tables() -> BTreeMap<String, Vec<String>> {
    let mut tables = BTreeMap::new();
    tables.insert(
        "CRM".to_string(),
        strings(&[
            DATE_RECEIVED,
            CUSTOMER_NAME,
            CONTACT_NUMBER,
            "Address/Location",
            "Lead Source",
            "Lead Status",
            "Product Type",
            "Budget Range",
            NEXT_FOLLOW_UP,
            FOLLOW_UP_TIME,
            "LEAD Sales Executive",
            STAFF_EMAIL,
            CUSTOMER_EMAIL,
            WHATSAPP,
            SALE_VALUE,
        ]),
    );
    tables.insert(
        "Delivery".to_string(),
        strings(&[
            DATE_RECEIVED,
            CUSTOMER_NAME,
            CONTACT_NUMBER,
            "Address/Location",
            "Product Type",
            "Delivery Status",
            "Delivery Sales Executive",
            "Delivery Assigned To",
            STAFF_EMAIL,
        ]),
    );
    tables.insert(
        "Service Request".to_string(),
        strings(&[
            DATE_RECEIVED,
            CUSTOMER_NAME,
            CONTACT_NUMBER,
            "Address/Location",
            "Product Type",
            "Complaint Status",
            "Complaint Registered By",
            "Complaint/Service Assigned To",
            "Warranty (Y/N)",
            STAFF_EMAIL,
        ]),
    );
    tables
}

fn default_required_columns() -> BTreeMap<String, Vec<String>> {
    let mut required = BTreeMap::new();
    required.insert("CRM".to_string(), strings(&[SALE_VALUE]));
    required
}

impl Default for Config {
    fn default() -> Self {
        let db_path = Self::database_file();
        Self {
            database: db_path.to_string_lossy().to_string(),
            primary_table: default_primary_table(),
            audit_table: default_audit_table(),
            users_table: default_users_table(),
            cache_ttl_secs: default_cache_ttl(),
            remote_timeout_ms: default_remote_timeout(),
            fallback_staff_email: default_fallback_staff_email(),
            fields: FieldRules::default(),
            tables: default_tables(),
            required_columns: default_required_columns(),
        }
    }
}

impl Config {
    /// Return the configuration directory under the user's home
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sheetcrm")
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("sheetcrm.conf")
    }

    /// Return the full path of the default SQLite store
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("sheetcrm.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.primary_table.trim().is_empty() {
            return Err(AppError::Config("primary_table must not be empty".into()));
        }
        if self.audit_table == self.users_table {
            return Err(AppError::Config(
                "audit_table and users_table must name different tables".into(),
            ));
        }
        if self.fields.name_field.trim().is_empty() || self.fields.phone_field.trim().is_empty() {
            return Err(AppError::Config(
                "fields.name_field and fields.phone_field are required".into(),
            ));
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Relative database names live in the config directory.
    pub fn resolve_database(name: &str) -> PathBuf {
        let p = Path::new(name);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            Self::config_dir().join(p)
        }
    }

    /// Initialize the configuration file and return the resolved database path.
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();

        let db_path = match custom_name {
            Some(name) => Self::resolve_database(&name),
            None => Self::database_file(),
        };

        if !is_test {
            fs::create_dir_all(&dir)?;
            let config = Config {
                database: db_path.to_string_lossy().to_string(),
                ..Config::default()
            };
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(config.to_yaml()?.as_bytes())?;
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let cfg: Config = serde_yaml::from_str("database: /tmp/x.sqlite\ncache_ttl_secs: 5\n")
            .expect("parse");
        assert_eq!(cfg.cache_ttl_secs, 5);
        assert_eq!(cfg.primary_table, "CRM");
        assert_eq!(cfg.fields.phone_field, "Contact Number");
        assert_eq!(cfg.required_columns["CRM"], vec!["SALE VALUE".to_string()]);
    }

    #[test]
    fn same_audit_and_users_table_is_rejected() {
        let cfg = Config {
            users_table: "History Log".into(),
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("temp");
        let cfg = Config::load_from(&dir.path().join("absent.conf")).expect("load");
        assert_eq!(cfg.audit_table, "History Log");
    }
}
