use crate::error::{AppError, AppResult};
use crate::model::{role::Role, user::User};
use crate::storage::{KeyValueStore, NEXT_USER_ID_KEY, USERS_KEY, load_json, save_json};
use crate::utils::email_filter::EmailFilter;
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Accounts written on first access when no directory is stored yet.
static SEED_USERS: Lazy<Vec<User>> = Lazy::new(|| {
    vec![
        User {
            id: 1,
            name: "Admin User".to_string(),
            email: "admin@company.com".to_string(),
            mobile: Some("9876543210".to_string()),
            role: Role::Admin,
        },
        User {
            id: 2,
            name: "John Smith".to_string(),
            email: "john@company.com".to_string(),
            mobile: Some("9876543211".to_string()),
            role: Role::Employee,
        },
        User {
            id: 3,
            name: "Jane Doe".to_string(),
            email: "jane@company.com".to_string(),
            mobile: Some("9876543212".to_string()),
            role: Role::Employee,
        },
    ]
});

/// The list of known identities and their roles.
///
/// Invariants: emails are unique (exact match), ids are never reused, and at least one
/// admin always remains.
pub struct Directory {
    kv: Arc<dyn KeyValueStore>,
    emails: EmailFilter,
    write_lock: Mutex<()>,
}

impl Directory {
    pub fn open(kv: Arc<dyn KeyValueStore>) -> AppResult<Self> {
        let directory = Self {
            kv,
            emails: EmailFilter::new(),
            write_lock: Mutex::new(()),
        };

        let users = directory.load()?;
        directory
            .emails
            .insert_batch(users.iter().map(|u| u.email.as_str()));
        log::info!("Email filter warmup complete: {} users", users.len());

        Ok(directory)
    }

    fn load(&self) -> AppResult<Vec<User>> {
        match load_json::<Vec<User>>(self.kv.as_ref(), USERS_KEY)? {
            Some(users) => Ok(users),
            None => {
                debug!("No stored directory, writing seed users");
                save_json(self.kv.as_ref(), USERS_KEY, SEED_USERS.as_slice())?;
                Ok(SEED_USERS.to_vec())
            }
        }
    }

    /// Lowest id never handed out. The stored counter only grows, so a removed
    /// user's id is not given to anyone else.
    fn next_id(&self, users: &[User]) -> AppResult<u64> {
        let floor = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let stored = load_json::<u64>(self.kv.as_ref(), NEXT_USER_ID_KEY)?;
        Ok(stored.map_or(floor, |next| next.max(floor)))
    }

    pub fn list(&self) -> AppResult<Vec<User>> {
        self.load()
    }

    pub fn find_by_id(&self, id: u64) -> AppResult<Option<User>> {
        Ok(self.load()?.into_iter().find(|u| u.id == id))
    }

    /// Looks a login identifier up as an email or a mobile number.
    pub fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<User>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|u| u.matches_identifier(identifier)))
    }

    pub fn add_user(&self, name: &str, email: &str, role: Role) -> AppResult<User> {
        let name = name.trim();
        let email = email.trim();

        if name.is_empty() || email.is_empty() {
            return Err(AppError::validation("Please fill in all fields"));
        }

        let _guard = self.write_lock.lock().expect("directory lock poisoned");
        let mut users = self.load()?;

        // the stored list decides; the filter is only a hint
        if users.iter().any(|u| u.email == email) {
            if !self.emails.might_exist(email) {
                warn!("Email filter missed a stored address");
            }
            return Err(AppError::DuplicateEmail);
        }

        let id = self.next_id(&users)?;
        save_json(self.kv.as_ref(), NEXT_USER_ID_KEY, &(id + 1))?;

        let user = User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            mobile: None,
            role,
        };

        users.push(user.clone());
        save_json(self.kv.as_ref(), USERS_KEY, &users)?;
        self.emails.insert(&user.email);

        info!(user_id = user.id, role = %user.role, "User added");
        Ok(user)
    }

    pub fn remove_user(&self, id: u64) -> AppResult<User> {
        let _guard = self.write_lock.lock().expect("directory lock poisoned");
        let mut users = self.load()?;

        let index = users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let admins = users.iter().filter(|u| u.is_admin()).count();
        if users[index].is_admin() && admins <= 1 {
            return Err(AppError::LastAdmin);
        }

        // pin the counter before the highest id can disappear from the list
        let next = self.next_id(&users)?;
        save_json(self.kv.as_ref(), NEXT_USER_ID_KEY, &next)?;

        let removed = users.remove(index);
        save_json(self.kv.as_ref(), USERS_KEY, &users)?;
        self.emails.remove(&removed.email);

        info!(user_id = removed.id, "User removed");
        Ok(removed)
    }
}
