use std::collections::HashMap;
use std::sync::RwLock;

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use tracing::{info, warn};

use plaza_types::models::{Profile, User};

/// The one username the admin console accepts. This is deliberately a
/// literal identity check, distinct from the per-user admin flag.
pub const SUPER_ADMIN: &str = "asad";

/// Roster hashed into the directory at startup. Accounts exist only in
/// process memory; admin mutations do not survive a restart.
const SEED_USERS: &[(&str, &str, bool, &str)] = &[
    ("asad", "asad369", true, "Admin user"),
    ("daniello", "rtf567", false, "Regular user"),
    ("shalil", "urq987", false, "Regular user"),
    ("roham", "yrc751", false, "Regular user"),
    ("nazari", "kae422", false, "Regular user"),
    ("erfan", "hwo935", false, "Regular user"),
];

pub type HashError = argon2::password_hash::Error;

/// In-memory user directory, handed to request handlers through shared
/// state. All access goes through these methods; there is no global.
pub struct UserDirectory {
    users: RwLock<HashMap<String, User>>,
}

impl UserDirectory {
    pub fn empty() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Build the directory from the built-in roster, hashing every seed
    /// password.
    pub fn seed_defaults() -> Result<Self, HashError> {
        let dir = Self::empty();
        for (username, password, is_admin, bio) in SEED_USERS {
            dir.insert_full(username, password, *is_admin, Profile::new(bio))?;
        }
        info!("seeded {} users", SEED_USERS.len());
        Ok(dir)
    }

    /// Check a credential pair. On success returns a snapshot of the user as
    /// it stands right now; the caller caches what it needs (the session
    /// keeps the admin flag from this instant).
    pub fn verify(&self, username: &str, password: &str) -> Option<User> {
        let users = self.read();
        let user = users.get(username)?;

        let parsed = PasswordHash::new(&user.password_hash).ok()?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .ok()?;

        Some(user.clone())
    }

    pub fn contains(&self, username: &str) -> bool {
        self.read().contains_key(username)
    }

    pub fn get(&self, username: &str) -> Option<User> {
        self.read().get(username).cloned()
    }

    /// Snapshot of the roster, sorted by username, for the admin view.
    pub fn list(&self) -> Vec<User> {
        let mut users: Vec<User> = self.read().values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }

    /// Admin add-user: non-admin, default profile, overwrite-if-exists.
    pub fn insert(&self, username: &str, password: &str) -> Result<(), HashError> {
        self.insert_full(username, password, false, Profile::new("New user"))
    }

    /// Remove a user. Refuses the designated super-admin; returns whether a
    /// user was actually removed.
    pub fn remove(&self, username: &str) -> bool {
        if username == SUPER_ADMIN {
            warn!("refusing to delete the designated admin");
            return false;
        }
        self.write().remove(username).is_some()
    }

    /// Re-hash and set a password for an existing user. Returns false if the
    /// user does not exist.
    pub fn set_password(&self, username: &str, password: &str) -> Result<bool, HashError> {
        let hash = hash_password(password)?;
        let mut users = self.write();
        match users.get_mut(username) {
            Some(user) => {
                user.password_hash = hash;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn update_bio(&self, username: &str, bio: &str) {
        if let Some(user) = self.write().get_mut(username) {
            user.profile.bio = bio.to_string();
        }
    }

    pub fn set_avatar(&self, username: &str, avatar: &str) {
        if let Some(user) = self.write().get_mut(username) {
            user.profile.avatar = avatar.to_string();
        }
    }

    fn insert_full(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
        profile: Profile,
    ) -> Result<(), HashError> {
        let user = User {
            username: username.to_string(),
            password_hash: hash_password(password)?,
            is_admin,
            profile,
        };
        self.write().insert(username.to_string(), user);
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, User>> {
        self.users.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, User>> {
        self.users.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn hash_password(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> UserDirectory {
        let dir = UserDirectory::empty();
        dir.insert_full("asad", "asad369", true, Profile::new("Admin user"))
            .unwrap();
        dir.insert_full("daniello", "rtf567", false, Profile::new("Regular user"))
            .unwrap();
        dir
    }

    #[test]
    fn verify_accepts_only_matching_pairs() {
        let dir = directory();

        let admin = dir.verify("asad", "asad369").expect("valid credentials");
        assert!(admin.is_admin);

        let user = dir.verify("daniello", "rtf567").expect("valid credentials");
        assert!(!user.is_admin);

        assert!(dir.verify("asad", "wrong").is_none());
        assert!(dir.verify("ghost", "asad369").is_none());
    }

    #[test]
    fn add_and_remove_users() {
        let dir = directory();

        dir.insert("prime", "hhq091").unwrap();
        let added = dir.get("prime").expect("inserted");
        assert!(!added.is_admin);
        assert_eq!(added.profile.bio, "New user");
        assert_eq!(added.profile.avatar, "default.png");

        assert!(dir.remove("prime"));
        assert!(!dir.contains("prime"));
        assert!(!dir.remove("prime"));
    }

    #[test]
    fn super_admin_cannot_be_removed() {
        let dir = directory();
        assert!(!dir.remove(SUPER_ADMIN));
        assert!(dir.contains(SUPER_ADMIN));
    }

    #[test]
    fn change_password_rehashes() {
        let dir = directory();

        assert!(dir.set_password("daniello", "fresh-pass").unwrap());
        assert!(dir.verify("daniello", "rtf567").is_none());
        assert!(dir.verify("daniello", "fresh-pass").is_some());

        assert!(!dir.set_password("ghost", "whatever").unwrap());
    }

    #[test]
    fn profile_updates_apply_to_acting_user_only() {
        let dir = directory();

        dir.update_bio("daniello", "hello there");
        dir.set_avatar("daniello", "daniello_ab12cd34.png");

        let updated = dir.get("daniello").unwrap();
        assert_eq!(updated.profile.bio, "hello there");
        assert_eq!(updated.profile.avatar, "daniello_ab12cd34.png");

        let other = dir.get("asad").unwrap();
        assert_eq!(other.profile.bio, "Admin user");
    }

    #[test]
    fn list_is_sorted_by_username() {
        let dir = directory();
        let names: Vec<String> = dir.list().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["asad", "daniello"]);
    }
}
