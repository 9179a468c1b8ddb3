//! Credential records kept in their own table, keyed on username alone.

use super::cache::TableCache;
use crate::errors::{AppError, AppResult};
use crate::models::record::TableSnapshot;
use crate::models::user::{USERS_HEADER, UserRecord, active_flag, parse_active_flag};
use crate::models::Role;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserChange {
    Created,
    Updated,
}

impl UserChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserChange::Created => "Created user",
            UserChange::Updated => "Updated user",
        }
    }
}

/// Position of each `USERS_HEADER` column in an actual header, matched
/// case-insensitively.
fn column_positions(header: &[String]) -> [Option<usize>; 5] {
    let mut out = [None; 5];
    for (slot, want) in out.iter_mut().zip(USERS_HEADER) {
        *slot = header.iter().position(|h| h.trim().eq_ignore_ascii_case(want));
    }
    out
}

fn normalize_username(s: &str) -> String {
    s.trim().to_lowercase()
}

fn parse_role(s: &str) -> Option<Role> {
    let s = s.trim();
    if s.is_empty() {
        return Some(Role::Viewer);
    }
    s.parse().ok()
}

pub struct UserStore {
    cache: Arc<TableCache>,
    table: String,
}

impl UserStore {
    pub fn new(cache: Arc<TableCache>, table: impl Into<String>) -> Self {
        Self {
            cache,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Drop the cached users snapshot.
    pub fn refresh(&self) {
        self.cache.invalidate(&self.table);
    }

    fn parse_users(snap: &TableSnapshot) -> Vec<UserRecord> {
        let pos = column_positions(&snap.header);
        let cell = |row: &[String], i: usize| -> String {
            pos[i]
                .and_then(|p| row.get(p))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        snap.rows
            .iter()
            .filter_map(|row| {
                let username = normalize_username(&cell(row, 0));
                if username.is_empty() {
                    return None;
                }
                Some(UserRecord {
                    username,
                    password_hash: cell(row, 1),
                    full_name: cell(row, 2),
                    role: parse_role(&cell(row, 3)),
                    active: parse_active_flag(&cell(row, 4)),
                })
            })
            .collect()
    }

    pub fn get_all(&self) -> AppResult<Vec<UserRecord>> {
        let snap = self.cache.get(&self.table)?;
        Ok(Self::parse_users(&snap))
    }

    /// Case-insensitive lookup against the cached snapshot.
    pub fn find(&self, username: &str) -> AppResult<Option<UserRecord>> {
        let wanted = normalize_username(username);
        Ok(self.get_all()?.into_iter().find(|u| u.username == wanted))
    }

    /// Make sure every canonical column exists in the header without
    /// touching data rows. Miscased names are rewritten in place; missing
    /// ones take a blank header cell if there is one, else a new column.
    pub fn ensure_header(&self) -> AppResult<Arc<TableSnapshot>> {
        let snap = self.cache.get_fresh(&self.table)?;
        let store = self.cache.store();
        let mut header = snap.header.clone();
        let mut changed = false;

        for (want, found) in USERS_HEADER.iter().zip(column_positions(&snap.header)) {
            match found {
                Some(idx) if header[idx] == *want => {}
                Some(idx) => {
                    store
                        .update_cell(&self.table, 1, idx + 1, want)
                        .map_err(|e| AppError::remote(&self.table, "rename header cell", e))?;
                    header[idx] = want.to_string();
                    changed = true;
                }
                None => {
                    if let Some(idx) = header.iter().position(|h| h.trim().is_empty()) {
                        store
                            .update_cell(&self.table, 1, idx + 1, want)
                            .map_err(|e| AppError::remote(&self.table, "fill header cell", e))?;
                        header[idx] = want.to_string();
                    } else {
                        store
                            .add_column(&self.table, want)
                            .map_err(|e| AppError::remote(&self.table, "add header column", e))?;
                        header.push(want.to_string());
                    }
                    changed = true;
                }
            }
        }

        if !changed {
            return Ok(snap);
        }
        info!(table = %self.table, "users header repaired");
        self.cache.get_fresh(&self.table)
    }

    pub fn upsert_user(
        &self,
        username: &str,
        password_hash: &str,
        full_name: &str,
        role: Role,
        active: bool,
    ) -> AppResult<UserChange> {
        let username = normalize_username(username);
        let password_hash = password_hash.trim();
        let full_name = full_name.trim();
        for (label, value) in [
            ("username", username.as_str()),
            ("password_hash", password_hash),
            ("full_name", full_name),
        ] {
            if value.is_empty() {
                return Err(AppError::Validation(format!("{label} is required")));
            }
        }

        let snap = self.ensure_header()?;
        let pos = column_positions(&snap.header);
        let values = [
            username.as_str(),
            password_hash,
            full_name,
            role.as_str(),
            active_flag(active),
        ];

        let existing = pos[0].and_then(|col| {
            snap.rows
                .iter()
                .position(|row| row.get(col).is_some_and(|v| normalize_username(v) == username))
        });

        let result = match existing {
            Some(index) => self.write_cells(&snap, index, &pos, &values).map(|_| UserChange::Updated),
            None => {
                let mut row = vec![String::new(); snap.header.len()];
                for (p, v) in pos.iter().zip(values) {
                    if let Some(p) = p {
                        row[*p] = v.to_string();
                    }
                }
                self.cache
                    .store()
                    .append_row(&self.table, &row)
                    .map(|_| UserChange::Created)
                    .map_err(|e| AppError::remote(&self.table, "append user", e))
            }
        };
        self.refresh();
        let change = result?;

        info!(table = %self.table, username = %username, change = change.as_str(), "user saved");
        Ok(change)
    }

    fn write_cells(
        &self,
        snap: &TableSnapshot,
        index: usize,
        pos: &[Option<usize>; 5],
        values: &[&str; 5],
    ) -> AppResult<()> {
        let row = TableSnapshot::remote_row_number(index);
        for (p, v) in pos.iter().zip(values) {
            let Some(p) = p else { continue };
            self.cache
                .store()
                .update_cell(&self.table, row, p + 1, v)
                .map_err(|e| AppError::remote(&self.table, format!("update user row {row}"), e))?;
        }
        debug!(table = %self.table, row, "user row rewritten");
        Ok(())
    }

    /// Mark a user inactive. The row is kept.
    pub fn deactivate(&self, username: &str) -> AppResult<()> {
        let wanted = normalize_username(username);
        let snap = self.ensure_header()?;
        let pos = column_positions(&snap.header);
        let (Some(name_col), Some(active_col)) = (pos[0], pos[4]) else {
            return Err(AppError::Schema {
                table: self.table.clone(),
                column: "active".into(),
            });
        };

        let index = snap
            .rows
            .iter()
            .position(|row| row.get(name_col).is_some_and(|v| normalize_username(v) == wanted))
            .ok_or_else(|| AppError::UnknownUser(wanted.clone()))?;

        let row = TableSnapshot::remote_row_number(index);
        let result = self
            .cache
            .store()
            .update_cell(&self.table, row, active_col + 1, active_flag(false))
            .map_err(|e| AppError::remote(&self.table, "deactivate user", e));
        self.refresh();
        result?;

        info!(table = %self.table, username = %wanted, "user deactivated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryStore;
    use crate::utils::clock::SystemClock;

    fn s(items: &[&str]) -> Vec<String> {
        items.iter().map(|x| x.to_string()).collect()
    }

    fn users_over(store: Arc<MemoryStore>) -> UserStore {
        let cache = Arc::new(
            TableCache::new(store, Arc::new(SystemClock), 60)
                .with_canonical_header("Users", s(&USERS_HEADER)),
        );
        UserStore::new(cache, "Users")
    }

    #[test]
    fn create_then_update_by_username() {
        let store = Arc::new(MemoryStore::new());
        let users = users_over(store.clone());

        let change = users
            .upsert_user("Alice", "$2b$hash", "Alice A", Role::Editor, true)
            .expect("create");
        assert_eq!(change, UserChange::Created);

        let change = users
            .upsert_user("  ALICE ", "$2b$other", "Alice B", Role::Admin, true)
            .expect("update");
        assert_eq!(change, UserChange::Updated);

        let all = users.get_all().expect("users");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].username, "alice");
        assert_eq!(all[0].role, Some(Role::Admin));
        assert_eq!(all[0].full_name, "Alice B");
        assert_eq!(store.dump("Users").expect("table").len(), 2);
    }

    #[test]
    fn miscased_and_missing_header_columns_are_healed_in_place() {
        let store = Arc::new(MemoryStore::new().with_table(
            "Users",
            vec![
                s(&["USERNAME", "Password_Hash", "full_name", "Role"]),
                s(&["bob", "h1", "Bob", "viewer"]),
            ],
        ));
        let users = users_over(store.clone());
        users.ensure_header().expect("heal");

        let rows = store.dump("Users").expect("table");
        assert_eq!(rows[0], s(&USERS_HEADER));
        assert_eq!(rows[1], s(&["bob", "h1", "Bob", "viewer"]));

        let bob = users.find("BOB").expect("find").expect("bob");
        assert_eq!(bob.role, Some(Role::Viewer));
        assert!(!bob.active);
    }

    #[test]
    fn blank_header_cells_are_reused() {
        let store = Arc::new(MemoryStore::new().with_table(
            "Users",
            vec![s(&["username", "", "full_name", "role", "active"])],
        ));
        let users = users_over(store.clone());
        users.ensure_header().expect("heal");
        assert_eq!(store.dump("Users").expect("table")[0], s(&USERS_HEADER));
    }

    #[test]
    fn required_fields_are_validated_before_any_write() {
        let store = Arc::new(MemoryStore::new());
        let users = users_over(store.clone());
        let err = users
            .upsert_user("carol", " ", "Carol", Role::Viewer, true)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.dump("Users").is_none());
    }

    #[test]
    fn deactivate_keeps_the_row() {
        let store = Arc::new(MemoryStore::new());
        let users = users_over(store);
        users
            .upsert_user("dave", "h", "Dave", Role::Editor, true)
            .expect("create");
        users.deactivate("Dave").expect("deactivate");

        let dave = users.find("dave").expect("find").expect("dave");
        assert!(!dave.active);
        assert!(matches!(
            users.deactivate("nobody"),
            Err(AppError::UnknownUser(_))
        ));
    }

    #[test]
    fn unknown_role_text_is_kept_as_none() {
        let store = Arc::new(MemoryStore::new().with_table(
            "Users",
            vec![s(&USERS_HEADER), s(&["eve", "h", "Eve", "superuser", "Y"]), s(&["", "h", "x", "", ""])],
        ));
        let users = users_over(store);
        let all = users.get_all().expect("users");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].role, None);
        assert!(all[0].active);
    }
}
