use super::record::Record;
use chrono::{DateTime, Local};
use std::fmt;

pub const AUDIT_HEADER: [&str; 7] = [
    "Timestamp",
    "Action",
    "Sheet",
    "Customer Name",
    "Contact Number",
    "Old Data",
    "New Data",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Insert,
    Update,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Insert => "INSERT",
            AuditAction::Update => "UPDATE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "INSERT" => Some(AuditAction::Insert),
            "UPDATE" => Some(AuditAction::Update),
            _ => None,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable line of the audit trail.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub timestamp: DateTime<Local>,
    pub action: AuditAction,
    pub table_name: String,
    pub identity_name: String,
    pub identity_phone: String,
    /// `None` for inserts.
    pub before: Option<Record>,
    pub after: Record,
}

impl AuditEntry {
    /// Row values in `AUDIT_HEADER` order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.to_rfc3339(),
            self.action.as_str().to_string(),
            self.table_name.clone(),
            self.identity_name.clone(),
            self.identity_phone.clone(),
            self.before
                .as_ref()
                .map(Record::to_json)
                .unwrap_or_else(|| "{}".to_string()),
            self.after.to_json(),
        ]
    }

    /// Rebuild an entry from an audit-table row; `None` if the row is not
    /// a well-formed audit line.
    pub fn from_record(rec: &Record) -> Option<Self> {
        let timestamp = DateTime::parse_from_rfc3339(rec.text("Timestamp").trim())
            .ok()?
            .with_timezone(&Local);
        let action = AuditAction::parse(rec.text("Action"))?;
        let before = match action {
            AuditAction::Insert => None,
            AuditAction::Update => Record::from_json(rec.text("Old Data")),
        };
        let after = Record::from_json(rec.text("New Data")).unwrap_or_default();

        Some(Self {
            timestamp,
            action,
            table_name: rec.text("Sheet").to_string(),
            identity_name: rec.text("Customer Name").to_string(),
            identity_phone: rec.text("Contact Number").to_string(),
            before,
            after,
        })
    }
}
