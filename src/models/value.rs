use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// A raw form value before normalization.
///
/// Callers hand over whatever their input widget produced; the normalizer
/// decides the canonical text for the target column.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Number(f64),
}

impl FieldValue {
    /// Plain stringification used for fields without a dedicated rule.
    pub fn to_plain_string(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Date(d) => d.format("%m/%d/%Y").to_string(),
            FieldValue::DateTime(dt) => dt.format("%m/%d/%Y").to_string(),
            FieldValue::Time(t) => t.format("%H:%M").to_string(),
            FieldValue::Number(n) => format_number(*n),
        }
    }
}

/// Integral numbers print without a trailing `.0`.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::Text(s.clone())
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(dt: NaiveDateTime) -> Self {
        FieldValue::DateTime(dt)
    }
}

impl From<NaiveTime> for FieldValue {
    fn from(t: NaiveTime) -> Self {
        FieldValue::Time(t)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_drop_trailing_zero_fraction() {
        assert_eq!(FieldValue::from(25000.0).to_plain_string(), "25000");
        assert_eq!(FieldValue::from(12.5).to_plain_string(), "12.5");
    }

    #[test]
    fn null_is_empty_not_literal() {
        assert_eq!(FieldValue::from(None::<&str>).to_plain_string(), "");
        assert_eq!(FieldValue::from(Some("x")), FieldValue::Text("x".into()));
    }
}
