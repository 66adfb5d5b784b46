//! Settings persistence with default fallback.

use crate::model::settings::Settings;
use crate::repo::kv_store::{KeyValueStore, StorageResult};
use log::warn;

/// Storage key holding the serialized settings object.
pub const SETTINGS_KEY: &str = "eq_settings";

/// Loads settings; absent, unreadable or malformed state yields defaults.
pub fn load_settings<S: KeyValueStore + ?Sized>(kv: &S) -> Settings {
    match kv.get(SETTINGS_KEY) {
        Ok(Some(payload)) => serde_json::from_str(&payload).unwrap_or_else(|err| {
            warn!("event=settings_load module=settings_store status=fallback reason=malformed error={err}");
            Settings::default()
        }),
        Ok(None) => Settings::default(),
        Err(err) => {
            warn!("event=settings_load module=settings_store status=fallback reason=read_failed error={err}");
            Settings::default()
        }
    }
}

/// Persists settings, replacing prior state.
pub fn save_settings<S: KeyValueStore + ?Sized>(kv: &mut S, settings: &Settings) -> StorageResult<()> {
    let payload = serde_json::to_string(settings)?;
    kv.put(SETTINGS_KEY, &payload)
}

#[cfg(test)]
mod tests {
    use super::{load_settings, save_settings, SETTINGS_KEY};
    use crate::model::settings::{Settings, Theme};
    use crate::repo::kv_store::{KeyValueStore, MemoryKeyValueStore};

    #[test]
    fn absent_and_malformed_state_yield_defaults() {
        let mut kv = MemoryKeyValueStore::new();
        assert_eq!(load_settings(&kv), Settings::default());

        kv.put(SETTINGS_KEY, "[1,2,3]").unwrap();
        assert_eq!(load_settings(&kv), Settings::default());
    }

    #[test]
    fn save_then_load_roundtrip() {
        let mut kv = MemoryKeyValueStore::new();
        let settings = Settings {
            sound: false,
            vibrate: true,
            theme: Theme::Dark,
        };
        save_settings(&mut kv, &settings).unwrap();
        assert_eq!(load_settings(&kv), settings);
    }
}
