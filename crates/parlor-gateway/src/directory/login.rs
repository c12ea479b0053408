use dashmap::DashMap;

/// Login registry: `user id -> current table id`.
///
/// `reassign` is the conditional-update primitive the matching engine relies
/// on: it only touches entries that already exist, so a user that was never
/// registered stays unknown no matter how often they are committed to a
/// table. Do not replace it with a plain upsert.
#[derive(Default)]
pub struct LoginRegistry {
    users: DashMap<String, String>,
}

impl LoginRegistry {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }

    /// Insert or overwrite unconditionally.
    pub fn register(&self, user: &str, table: &str) {
        self.users.insert(user.to_string(), table.to_string());
    }

    /// Update only if an entry already exists. Returns whether it did.
    pub fn reassign(&self, user: &str, table: &str) -> bool {
        match self.users.get_mut(user) {
            Some(mut entry) => {
                *entry = table.to_string();
                true
            }
            None => false,
        }
    }

    pub fn lookup(&self, user: &str) -> Option<String> {
        self.users.get(user).map(|t| t.value().clone())
    }

    /// Drop the entry on disconnect. Returns the table the user was in.
    pub fn unregister(&self, user: &str) -> Option<String> {
        self.users.remove(user).map(|(_, t)| t)
    }
}
