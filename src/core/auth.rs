//! Role and credential checks over the user store.

use super::users::UserStore;
use crate::errors::{AppError, AppResult};
use crate::models::{Role, UserRecord};
use std::sync::Arc;
use tracing::{debug, warn};

/// Checks a plain password against an opaque stored hash. The crate
/// never hashes anything itself.
pub trait PasswordVerifier {
    fn verify(&self, password: &str, stored_hash: &str) -> bool;
}

impl<F> PasswordVerifier for F
where
    F: Fn(&str, &str) -> bool,
{
    fn verify(&self, password: &str, stored_hash: &str) -> bool {
        self(password, stored_hash)
    }
}

/// An unparseable role grants nothing.
pub fn role_at_least(role: Option<Role>, min: Role) -> bool {
    role.is_some_and(|r| r >= min)
}

pub struct AuthGate {
    users: Arc<UserStore>,
}

impl AuthGate {
    pub fn new(users: Arc<UserStore>) -> Self {
        Self { users }
    }

    /// Cached lookup first; on a miss, refresh once since the user may
    /// have been created after the snapshot was taken.
    fn lookup(&self, username: &str) -> AppResult<UserRecord> {
        if let Some(user) = self.users.find(username)? {
            return Ok(user);
        }
        debug!(username, "user not in cached snapshot; refreshing");
        self.users.refresh();
        self.users
            .find(username)?
            .ok_or_else(|| AppError::UnknownUser(username.trim().to_lowercase()))
    }

    pub fn authorize(&self, username: &str, min_role: Role) -> AppResult<UserRecord> {
        let user = self.lookup(username)?;
        if !user.active {
            warn!(username = %user.username, "inactive user refused");
            return Err(AppError::Unauthorized(format!(
                "user '{}' is inactive",
                user.username
            )));
        }
        if !role_at_least(user.role, min_role) {
            warn!(username = %user.username, role = user.role_label(), required = %min_role, "insufficient role");
            return Err(AppError::Unauthorized(format!(
                "user '{}' ({}) lacks the {} role",
                user.username,
                user.role_label(),
                min_role
            )));
        }
        Ok(user)
    }

    pub fn login(
        &self,
        username: &str,
        password: &str,
        verifier: &dyn PasswordVerifier,
    ) -> AppResult<UserRecord> {
        let user = self.authorize(username, Role::Viewer)?;
        if password.is_empty() || user.password_hash.is_empty() {
            return Err(AppError::Unauthorized("missing password or hash".into()));
        }
        if !verifier.verify(password, &user.password_hash) {
            warn!(username = %user.username, "password rejected");
            return Err(AppError::Unauthorized("invalid credentials".into()));
        }
        debug!(username = %user.username, "login accepted");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::TableCache;
    use crate::models::user::USERS_HEADER;
    use crate::remote::{MemoryStore, RemoteStore};
    use crate::utils::clock::SystemClock;

    fn s(items: &[&str]) -> Vec<String> {
        items.iter().map(|x| x.to_string()).collect()
    }

    fn gate(rows: Vec<Vec<String>>) -> (Arc<MemoryStore>, Arc<UserStore>, AuthGate) {
        let mut values = vec![s(&USERS_HEADER)];
        values.extend(rows);
        let store = Arc::new(MemoryStore::new().with_table("Users", values));
        let cache = Arc::new(TableCache::new(store.clone(), Arc::new(SystemClock), 600));
        let users = Arc::new(UserStore::new(cache, "Users"));
        (store, users.clone(), AuthGate::new(users))
    }

    fn plain(password: &str, hash: &str) -> bool {
        format!("plain:{password}") == hash
    }

    #[test]
    fn role_ordering_and_unknown_roles() {
        assert!(role_at_least(Some(Role::Admin), Role::Editor));
        assert!(!role_at_least(Some(Role::Viewer), Role::Editor));
        assert!(!role_at_least(None, Role::Viewer));
    }

    #[test]
    fn authorize_checks_activity_and_role() {
        let (_, _, gate) = gate(vec![
            s(&["ann", "h", "Ann", "Editor", "yes"]),
            s(&["ben", "h", "Ben", "Admin", "N"]),
        ]);
        assert_eq!(gate.authorize("ANN", Role::Editor).expect("ann").username, "ann");
        assert!(matches!(gate.authorize("ann", Role::Admin), Err(AppError::Unauthorized(_))));
        assert!(matches!(gate.authorize("ben", Role::Viewer), Err(AppError::Unauthorized(_))));
        assert!(matches!(gate.authorize("zed", Role::Viewer), Err(AppError::UnknownUser(_))));
    }

    #[test]
    fn freshly_added_user_is_found_after_one_refresh() {
        let (store, users, gate) = gate(Vec::new());
        users.get_all().expect("warm cache");
        store
            .append_row("Users", &s(&["cat", "plain:pw", "Cat", "Viewer", "1"]))
            .expect("append");
        assert_eq!(gate.authorize("cat", Role::Viewer).expect("cat").full_name, "Cat");
    }

    #[test]
    fn login_uses_the_verifier() {
        let (_, _, gate) = gate(vec![
            s(&["dan", "plain:secret", "Dan", "Viewer", "TRUE"]),
            s(&["eli", "", "Eli", "Viewer", "Y"]),
        ]);
        assert!(gate.login("dan", "secret", &plain).is_ok());
        assert!(matches!(gate.login("dan", "wrong", &plain), Err(AppError::Unauthorized(_))));
        assert!(matches!(gate.login("dan", "", &plain), Err(AppError::Unauthorized(_))));
        assert!(matches!(gate.login("eli", "x", &plain), Err(AppError::Unauthorized(_))));
    }
}
