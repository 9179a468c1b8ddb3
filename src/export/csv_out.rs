use crate::errors::AppResult;
use crate::models::TableSnapshot;
use std::path::Path;

/// Header line followed by every data row, in table order.
pub(crate) fn write_csv(snap: &TableSnapshot, path: &Path) -> AppResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(&snap.header)?;
    for row in &snap.rows {
        wtr.write_record(row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().expect("temp");
        let path = dir.path().join("crm.csv");
        let snap = TableSnapshot::from_values(
            "CRM",
            vec![
                vec!["Customer Name".into(), "Notes".into()],
                vec!["John Doe".into(), "likes, commas".into()],
            ],
            Local::now(),
        );
        write_csv(&snap, &path).expect("write");

        let text = std::fs::read_to_string(&path).expect("read");
        assert_eq!(text, "Customer Name,Notes\nJohn Doe,\"likes, commas\"\n");
    }
}
