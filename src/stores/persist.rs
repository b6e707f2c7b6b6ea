//! Persistence backends for the client-side stores.
//!
//! [`CookieJar`] holds the auth cookie with its attributes and expiry;
//! [`KeyValueStorage`] holds string values by key. Each has an in-memory
//! implementation and a file-backed one rooted in the client state directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        }
    }
}

/// A cookie as written by a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    /// Lifetime in seconds from the moment it is written.
    pub max_age: i64,
    pub same_site: SameSite,
    pub secure: bool,
}

impl Cookie {
    /// Render in `Set-Cookie` form.
    pub fn to_header_value(&self) -> String {
        let mut out = format!(
            "{}={}; Path={}; Max-Age={}; SameSite={}",
            self.name,
            self.value,
            self.path,
            self.max_age,
            self.same_site.as_str()
        );
        if self.secure {
            out.push_str("; Secure");
        }
        out
    }
}

/// A cookie at rest, with its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub value: String,
    pub path: String,
    /// Epoch seconds after which the cookie no longer exists.
    pub expires_at: i64,
    pub same_site: SameSite,
    pub secure: bool,
}

impl StoredCookie {
    fn from_cookie(cookie: &Cookie, now: i64) -> Self {
        Self {
            value: cookie.value.clone(),
            path: cookie.path.clone(),
            expires_at: now + cookie.max_age,
            same_site: cookie.same_site,
            secure: cookie.secure,
        }
    }

    fn is_live(&self, now: i64) -> bool {
        self.expires_at > now
    }
}

pub trait CookieJar: Send {
    /// Value of a live cookie, or `None` if it is missing or expired.
    fn get(&self, name: &str) -> Result<Option<String>>;
    fn set(&mut self, cookie: &Cookie) -> Result<()>;
    fn remove(&mut self, name: &str) -> Result<()>;
}

pub trait KeyValueStorage: Send {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

fn now_epoch() -> i64 {
    chrono::Utc::now().timestamp()
}

fn live_value(cookies: &HashMap<String, StoredCookie>, name: &str) -> Option<String> {
    cookies
        .get(name)
        .filter(|c| c.is_live(now_epoch()))
        .map(|c| c.value.clone())
}

#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: HashMap<String, StoredCookie>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored form of a cookie, expired or not.
    pub fn cookie(&self, name: &str) -> Option<&StoredCookie> {
        self.cookies.get(name)
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(live_value(&self.cookies, name))
    }

    fn set(&mut self, cookie: &Cookie) -> Result<()> {
        self.cookies
            .insert(cookie.name.clone(), StoredCookie::from_cookie(cookie, now_epoch()));
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<()> {
        self.cookies.remove(name);
        Ok(())
    }
}

/// Cookie jar persisted as one JSON file.
#[derive(Debug, Clone)]
pub struct FileCookieJar {
    path: PathBuf,
}

impl FileCookieJar {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<state_dir>/cookies.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join("cookies.json"))
    }

    fn read(&self) -> Result<HashMap<String, StoredCookie>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }

    fn write(&self, cookies: &HashMap<String, StoredCookie>) -> Result<()> {
        write_atomic(&self.path, &serde_json::to_string_pretty(cookies)?)
    }
}

impl CookieJar for FileCookieJar {
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(live_value(&self.read()?, name))
    }

    fn set(&mut self, cookie: &Cookie) -> Result<()> {
        let mut cookies = self.read()?;
        cookies.insert(cookie.name.clone(), StoredCookie::from_cookie(cookie, now_epoch()));
        self.write(&cookies)
    }

    fn remove(&mut self, name: &str) -> Result<()> {
        let mut cookies = self.read()?;
        if cookies.remove(name).is_some() {
            self.write(&cookies)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// Key-value storage with one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn item_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            bail!("invalid storage key: {key:?}");
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.item_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Some(contents))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        write_atomic(&self.item_path(key)?, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        let path = self.item_path(key)?;
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        }
        Ok(())
    }
}

/// Write via a temp file and rename so readers never see a partial file.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, contents)
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path).context("failed to rename temp file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cookie(max_age: i64) -> Cookie {
        Cookie {
            name: "session".into(),
            value: "v1".into(),
            path: "/".into(),
            max_age,
            same_site: SameSite::Strict,
            secure: true,
        }
    }

    #[test]
    fn header_value_lists_attributes() {
        assert_eq!(
            cookie(60).to_header_value(),
            "session=v1; Path=/; Max-Age=60; SameSite=Strict; Secure"
        );
    }

    #[test]
    fn file_jar_round_trips_and_removes() {
        let tmp = TempDir::new().unwrap();
        let mut jar = FileCookieJar::in_dir(tmp.path());

        jar.set(&cookie(60)).unwrap();
        assert_eq!(jar.get("session").unwrap().as_deref(), Some("v1"));

        // a fresh handle on the same file sees the cookie
        let reopened = FileCookieJar::in_dir(tmp.path());
        assert_eq!(reopened.get("session").unwrap().as_deref(), Some("v1"));

        jar.remove("session").unwrap();
        assert!(jar.get("session").unwrap().is_none());
    }

    #[test]
    fn expired_cookie_is_absent() {
        let tmp = TempDir::new().unwrap();
        let mut jar = FileCookieJar::in_dir(tmp.path());
        jar.set(&cookie(-1)).unwrap();
        assert!(jar.get("session").unwrap().is_none());
    }

    #[test]
    fn file_storage_round_trips() {
        let tmp = TempDir::new().unwrap();
        let mut storage = FileStorage::new(tmp.path().join("state"));

        assert!(storage.get_item("setting").unwrap().is_none());
        storage.set_item("setting", r#"{"depth":4}"#).unwrap();
        assert_eq!(
            storage.get_item("setting").unwrap().as_deref(),
            Some(r#"{"depth":4}"#)
        );
        storage.remove_item("setting").unwrap();
        assert!(storage.get_item("setting").unwrap().is_none());
    }

    #[test]
    fn file_storage_rejects_path_keys() {
        let tmp = TempDir::new().unwrap();
        let mut storage = FileStorage::new(tmp.path());
        assert!(storage.set_item("../escape", "x").is_err());
    }
}
