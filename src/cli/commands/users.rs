use crate::cli::parser::{Commands, UsersAction};
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::Role;
use crate::models::user::{active_flag, parse_active_flag};
use crate::ui::messages::{header, success, warning};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Users { action } = cmd else {
        return Ok(());
    };
    let store = super::open_store(cfg)?;

    match action {
        UsersAction::List => {
            let users = store.get_users()?;
            header(format!("Users ({})", cfg.users_table));
            if users.is_empty() {
                warning("No users defined.");
                return Ok(());
            }
            let mut out = Table::new(
                ["username", "full_name", "role", "active"]
                    .iter()
                    .map(|h| h.to_string())
                    .collect(),
            );
            for u in &users {
                out.add_row(vec![
                    u.username.clone(),
                    u.full_name.clone(),
                    u.role_label().to_string(),
                    active_flag(u.active).to_string(),
                ]);
            }
            print!("{}", out.render());
        }
        UsersAction::Add {
            username,
            password_hash,
            full_name,
            role,
            active,
        } => {
            let role: Role = role.parse()?;
            let change = store.upsert_user(
                username,
                password_hash,
                full_name,
                role,
                parse_active_flag(active),
            )?;
            success(format!("{}: {}", change.as_str(), username.trim().to_lowercase()));
        }
        UsersAction::Deactivate { username } => {
            store.deactivate_user(username)?;
            success(format!("User '{}' deactivated", username.trim().to_lowercase()));
        }
    }
    Ok(())
}
