//! Table rendering utilities for CLI outputs.

use unicode_width::UnicodeWidthStr;

const MAX_CELL_WIDTH: usize = 32;

pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let data = self
                    .rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| c.width())
                    .max()
                    .unwrap_or(0);
                h.width().max(data).min(MAX_CELL_WIDTH)
            })
            .collect()
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut out = String::new();

        push_line(&mut out, &self.headers, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, &rule, &widths);

        for row in &self.rows {
            push_line(&mut out, row, &widths);
        }

        out
    }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, w)| fit(cells.get(i).map(String::as_str).unwrap_or(""), *w))
        .collect();
    out.push_str(line.join(" | ").trim_end());
    out.push('\n');
}

/// Truncate to `width` display columns (with an ellipsis) and pad.
fn fit(cell: &str, width: usize) -> String {
    let mut s = String::new();
    if cell.width() > width {
        let mut used = 0;
        for c in cell.chars() {
            let cw = UnicodeWidthStr::width(c.encode_utf8(&mut [0; 4]) as &str);
            if used + cw + 1 > width {
                break;
            }
            s.push(c);
            used += cw;
        }
        s.push('…');
    } else {
        s.push_str(cell);
    }
    let pad = width.saturating_sub(s.width());
    s.push_str(&" ".repeat(pad));
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_and_long_cells_truncate() {
        let mut t = Table::new(vec!["Name".into(), "Status".into()]);
        t.add_row(vec!["John Doe".into(), "Won".into()]);
        t.add_row(vec!["x".repeat(40), "New Lead".into()]);
        let out = t.render();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Name"));
        assert!(lines[3].contains('…'));
        assert!(lines[3].contains("New Lead"));
    }
}
