//! Client-side state: the worker credential and the research settings, each an
//! explicit context object over a pluggable persistence backend.

pub mod auth;
pub mod persist;
pub mod settings;

pub use auth::{AuthState, AuthStore};
pub use persist::{
    Cookie, CookieJar, FileCookieJar, FileStorage, KeyValueStorage, MemoryCookieJar,
    MemoryStorage,
};
pub use settings::{SettingStore, Settings, SettingsPatch};
