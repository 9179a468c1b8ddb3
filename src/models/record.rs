use chrono::{DateTime, Local};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Remote row number of the first data row (row 1 holds the header).
pub const FIRST_DATA_ROW: usize = 2;

/// Ordered field-name → value mapping.
///
/// Keys are unique; inserting an existing key replaces the value in place
/// and keeps the original position.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<V = String> {
    entries: Vec<(String, V)>,
}

impl<V> Default for Record<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> Record<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<V>) -> Self {
        self.insert(key, value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> FromIterator<(String, V)> for Record<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut rec = Record::new();
        for (k, v) in iter {
            rec.insert(k, v);
        }
        rec
    }
}

impl<V> IntoIterator for Record<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Record<String> {
    /// Value of `key`, or `""` when the field is absent.
    pub fn text(&self, key: &str) -> &str {
        self.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Parse a JSON object back into a record. Non-string values are
    /// stringified; anything other than an object yields `None`.
    pub fn from_json(raw: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(raw).ok()?;
        let obj = value.as_object()?;
        Some(
            obj.iter()
                .map(|(k, v)| {
                    let s = match v {
                        serde_json::Value::String(s) => s.clone(),
                        serde_json::Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    (k.clone(), s)
                })
                .collect(),
        )
    }
}

impl<V: Serialize> Serialize for Record<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Immutable, timestamped copy of a table's header and data rows.
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    pub table: String,
    /// Header names, with duplicates disambiguated as `Name_2`, `Name_3`, ...
    pub header: Vec<String>,
    /// Data rows padded to header width. Index 0 is remote row 2.
    pub rows: Vec<Vec<String>>,
    pub fetched_at: DateTime<Local>,
}

impl TableSnapshot {
    pub fn empty(table: &str, header: Vec<String>, fetched_at: DateTime<Local>) -> Self {
        Self {
            table: table.to_string(),
            header: disambiguate_header(&header),
            rows: Vec::new(),
            fetched_at,
        }
    }

    /// Build from raw `get_all_rows` output (row 0 is the header).
    pub fn from_values(table: &str, values: Vec<Vec<String>>, fetched_at: DateTime<Local>) -> Self {
        let mut it = values.into_iter();
        let raw_header = it.next().unwrap_or_default();
        let header = disambiguate_header(&raw_header);
        let width = header.len();

        let rows = it
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, String::new());
                }
                row
            })
            .collect();

        Self {
            table: table.to_string(),
            header,
            rows,
            fetched_at,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_header(&self) -> bool {
        !self.header.is_empty()
    }

    /// 0-based position of `name` in the header.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Cell text, `""` for a missing column or row.
    pub fn cell(&self, row: usize, column: &str) -> &str {
        self.column_index(column)
            .and_then(|c| self.rows.get(row).and_then(|r| r.get(c)))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn record(&self, row: usize) -> Option<Record> {
        let values = self.rows.get(row)?;
        Some(
            self.header
                .iter()
                .zip(values.iter())
                .map(|(h, v)| (h.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn records(&self) -> Vec<Record> {
        (0..self.rows.len()).filter_map(|i| self.record(i)).collect()
    }

    /// Remote (1-based) row number for a data-row index.
    pub fn remote_row_number(row: usize) -> usize {
        row + FIRST_DATA_ROW
    }
}

/// Rename repeated header cells so every column has a distinct key.
/// Blank cells stay blank.
pub fn disambiguate_header(raw: &[String]) -> Vec<String> {
    let mut seen: Vec<(&str, usize)> = Vec::new();
    raw.iter()
        .map(|h| match seen.iter_mut().find(|(name, _)| *name == h.as_str()) {
            _ if h.trim().is_empty() => h.clone(),
            Some((_, count)) => {
                *count += 1;
                format!("{}_{}", h, count)
            }
            None => {
                seen.push((h.as_str(), 1));
                h.clone()
            }
        })
        .collect()
}
