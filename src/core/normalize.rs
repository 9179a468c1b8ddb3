//! Canonical on-disk text for every field value.

use crate::config::{Config, FieldRules};
use crate::models::value::FieldValue;
use crate::utils::date::{format_canonical, from_serial, parse_loose_date};
use crate::utils::text::{apply_acronyms, title_case};
use crate::utils::time::normalize_clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Date,
    Time,
    Email,
    StaffEmail,
    Title,
    Trimmed,
    Plain,
}

/// Pure `(field name, raw value) -> canonical string` mapping driven by
/// the configured field rules.
#[derive(Debug, Clone)]
pub struct FieldNormalizer {
    rules: FieldRules,
    fallback_staff_email: String,
}

impl FieldNormalizer {
    pub fn new(rules: FieldRules, fallback_staff_email: impl Into<String>) -> Self {
        Self {
            rules,
            fallback_staff_email: fallback_staff_email.into().trim().to_lowercase(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.fields.clone(), cfg.fallback_staff_email.clone())
    }

    pub fn rules(&self) -> &FieldRules {
        &self.rules
    }

    pub fn fallback_staff_email(&self) -> &str {
        &self.fallback_staff_email
    }

    fn kind(&self, field: &str) -> FieldKind {
        let has = |set: &[String]| set.iter().any(|f| f == field);
        if has(&self.rules.date_fields) {
            FieldKind::Date
        } else if has(&self.rules.time_fields) {
            FieldKind::Time
        } else if field == self.rules.staff_email_field {
            FieldKind::StaffEmail
        } else if has(&self.rules.email_fields) {
            FieldKind::Email
        } else if has(&self.rules.title_fields) {
            FieldKind::Title
        } else if has(&self.rules.trimmed_fields) {
            FieldKind::Trimmed
        } else {
            FieldKind::Plain
        }
    }

    pub fn normalize(&self, field: &str, raw: &FieldValue) -> String {
        match self.kind(field) {
            FieldKind::Date => normalize_date(raw),
            FieldKind::Time => normalize_time(raw),
            FieldKind::Email => raw.to_plain_string().trim().to_lowercase(),
            FieldKind::StaffEmail => {
                let v = raw.to_plain_string().trim().to_lowercase();
                if v.is_empty() {
                    self.fallback_staff_email.clone()
                } else {
                    v
                }
            }
            FieldKind::Title => {
                apply_acronyms(&title_case(raw.to_plain_string().trim()), &self.rules.acronyms)
            }
            FieldKind::Trimmed => raw.to_plain_string().trim().to_string(),
            FieldKind::Plain => raw.to_plain_string(),
        }
    }
}

fn normalize_date(raw: &FieldValue) -> String {
    let parsed = match raw {
        FieldValue::Date(d) => Some(*d),
        FieldValue::DateTime(dt) => Some(dt.date()),
        FieldValue::Text(s) => parse_loose_date(s),
        FieldValue::Number(n) => from_serial(*n),
        FieldValue::Time(_) | FieldValue::Null => None,
    };
    parsed.map(format_canonical).unwrap_or_default()
}

fn normalize_time(raw: &FieldValue) -> String {
    match raw {
        FieldValue::Time(t) => t.format("%H:%M").to_string(),
        FieldValue::DateTime(dt) => dt.time().format("%H:%M").to_string(),
        FieldValue::Text(s) => normalize_clock(s).unwrap_or_else(|| s.trim().to_string()),
        other => other.to_plain_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn normalizer() -> FieldNormalizer {
        FieldNormalizer::new(FieldRules::default(), "Desk@Example.com ")
    }

    #[test]
    fn date_spellings_converge() {
        let n = normalizer();
        let d = NaiveDate::from_ymd_opt(2024, 1, 5).expect("date");
        for raw in [
            FieldValue::from("2024-01-05"),
            FieldValue::from(d),
            FieldValue::from("01/05/2024"),
            FieldValue::from(d.and_hms_opt(18, 0, 0).expect("datetime")),
        ] {
            assert_eq!(n.normalize("DATE RECEIVED", &raw), "01/05/2024");
        }
        assert_eq!(n.normalize("Next Follow-up Date", &FieldValue::from("garbage")), "");
        assert_eq!(n.normalize("Next Follow-up Date", &FieldValue::Null), "");
    }

    #[test]
    fn time_fields_pad_clamp_or_pass_through() {
        let n = normalizer();
        let f = "Follow-up Time (HH:MM)";
        assert_eq!(n.normalize(f, &FieldValue::from("9:5")), "09:05");
        assert_eq!(n.normalize(f, &FieldValue::from("10:30:45")), "10:30");
        assert_eq!(n.normalize(f, &FieldValue::from("24:61")), "23:59");
        assert_eq!(n.normalize(f, &FieldValue::from("after lunch")), "after lunch");
        let t = NaiveTime::from_hms_opt(7, 15, 0).expect("time");
        assert_eq!(n.normalize(f, &FieldValue::from(t)), "07:15");
    }

    #[test]
    fn emails_lowercase_and_staff_fallback() {
        let n = normalizer();
        assert_eq!(
            n.normalize("Customer Email", &FieldValue::from("  John@Mail.COM ")),
            "john@mail.com"
        );
        assert_eq!(n.normalize("Customer Email", &FieldValue::from("")), "");
        assert_eq!(n.normalize("Staff Email", &FieldValue::from("")), "desk@example.com");
        assert_eq!(n.normalize("Staff Email", &FieldValue::Null), "desk@example.com");
    }

    #[test]
    fn title_fields_with_acronyms() {
        let n = normalizer();
        assert_eq!(n.normalize("Lead Status", &FieldValue::from("new lead")), "New Lead");
        assert_eq!(n.normalize("Product Type", &FieldValue::from("tv unit")), "TV Unit");
        assert_eq!(n.normalize("Product Type", &FieldValue::from("KREATION X2")), "Kreation X2");
        assert_eq!(n.normalize("Customer Name", &FieldValue::from("  john DOE ")), "John Doe");
    }

    #[test]
    fn other_fields_stringify() {
        let n = normalizer();
        assert_eq!(n.normalize("Notes", &FieldValue::Null), "");
        assert_eq!(n.normalize("SALE VALUE", &FieldValue::from(25000.0)), "25000");
        assert_eq!(n.normalize("Notes", &FieldValue::from(" as typed ")), " as typed ");
        assert_eq!(
            n.normalize("Customer WhatsApp (+91XXXXXXXXXX)", &FieldValue::from(" +9199 ")),
            "+9199"
        );
    }
}
