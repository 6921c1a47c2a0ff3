//! Live settings value with persistence and change subscriptions.
//!
//! The store loads its value once when opened and afterwards changes only through
//! [`SettingsStore::update`] and [`SettingsStore::reload`]. Every mutation runs under a
//! single mutex: the update is applied to storage first, and only once the write
//! has landed is the in-memory value replaced and subscribers notified. A failed write
//! leaves both untouched.
//!
//! Storage applies each update to the table as currently persisted, under its own
//! writer lock, so several stores on one file never revert each other's fields.

use anyhow::Result;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::storage::{PreferenceStorage, Preferences};
use super::{PersistenceUnavailable, SettingUpdate, UserSettings};

struct StoreState {
    current: UserSettings,
    subscribers: Vec<Sender<UserSettings>>,
}

impl StoreState {
    /// Push `current` to every subscriber, dropping the ones that went away.
    fn notify(&mut self) {
        let value = self.current;
        self.subscribers.retain(|tx| tx.send(value).is_ok());
    }
}

/// Thread-safe, observable settings store.
pub struct SettingsStore {
    storage: Box<dyn PreferenceStorage>,
    state: Mutex<StoreState>,
}

impl SettingsStore {
    /// Open a store, loading the persisted value.
    ///
    /// A storage that cannot be read is logged and treated as empty, so the store
    /// starts from defaults.
    pub fn open(storage: Box<dyn PreferenceStorage>) -> Self {
        let preferences = match storage.load() {
            Ok(preferences) => preferences,
            Err(e) => {
                log_pipe!();
                log_warning!("Could not load settings, using defaults: {e:#}");
                Preferences::new()
            }
        };
        let current = UserSettings::from_preferences(&preferences);

        Self {
            storage,
            state: Mutex::new(StoreState {
                current,
                subscribers: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current settings.
    pub fn read(&self) -> UserSettings {
        self.lock().current
    }

    /// Apply one update, persist it, then notify subscribers.
    ///
    /// The update is applied to the table as currently stored, so fields saved by
    /// another writer since this store last read them are kept. The published value
    /// reflects those fields too.
    ///
    /// On a storage failure the returned error wraps [`PersistenceUnavailable`] and the
    /// previous value stays in effect.
    pub fn update(&self, update: SettingUpdate) -> Result<UserSettings> {
        let mut state = self.lock();

        let next = match self.storage.modify(&update) {
            Ok(next) => next,
            Err(e) => {
                return Err(PersistenceUnavailable {
                    reason: format!("{e:#}"),
                }
                .into());
            }
        };

        let settings = UserSettings::from_preferences(&next);
        if settings != state.current {
            state.current = settings;
            state.notify();
        }
        Ok(settings)
    }

    /// Re-read storage and publish the value if it changed.
    ///
    /// Returns whether the value changed. Read failures leave the current value in place.
    pub fn reload(&self) -> Result<bool> {
        let mut state = self.lock();

        let preferences = self.storage.load()?;
        let settings = UserSettings::from_preferences(&preferences);

        if settings == state.current {
            return Ok(false);
        }
        state.current = settings;
        state.notify();
        Ok(true)
    }

    /// Subscribe to changes. The current value is delivered immediately.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let mut state = self.lock();
        // The receiver is alive, so this send cannot fail
        let _ = tx.send(state.current);
        state.subscribers.push(tx);
        Subscription { rx }
    }

    /// Number of live subscriptions as of the last notification.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// File backing this store, if any.
    pub fn location(&self) -> Option<std::path::PathBuf> {
        self.storage.location()
    }
}

/// Receiving end of a settings subscription. Dropping it unsubscribes.
pub struct Subscription {
    rx: Receiver<UserSettings>,
}

impl Subscription {
    /// Block until the next value arrives. `None` once the store is gone.
    pub fn recv(&self) -> Option<UserSettings> {
        self.rx.recv().ok()
    }

    /// Wait up to `timeout` for the next value.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<UserSettings> {
        match self.rx.recv_timeout(timeout) {
            Ok(value) => Some(value),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Next pending value, without blocking.
    pub fn try_recv(&self) -> Option<UserSettings> {
        self.rx.try_recv().ok()
    }

    /// Drain pending values and return the most recent one.
    pub fn latest(&self) -> Option<UserSettings> {
        self.rx.try_iter().last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TemperatureUnit;
    use crate::settings::storage::{MemoryPreferenceStorage, MockPreferenceStorage};

    #[test]
    fn test_update_persists_before_notifying() {
        let mut storage = MockPreferenceStorage::new();
        storage.expect_load().returning(|| Ok(Preferences::new()));
        storage
            .expect_modify()
            .withf(|update| {
                *update == SettingUpdate::TemperatureUnit(TemperatureUnit::Fahrenheit)
            })
            .times(1)
            .returning(|update| {
                let mut preferences = Preferences::new();
                update.apply_to(&mut preferences);
                Ok(preferences)
            });

        let store = SettingsStore::open(Box::new(storage));
        let subscription = store.subscribe();
        assert_eq!(subscription.try_recv(), Some(UserSettings::default()));

        store
            .update(SettingUpdate::TemperatureUnit(TemperatureUnit::Fahrenheit))
            .unwrap();

        let notified = subscription.try_recv().unwrap();
        assert_eq!(notified.temperature_unit, TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn test_failed_write_keeps_last_known_value() {
        let mut storage = MockPreferenceStorage::new();
        storage.expect_load().returning(|| Ok(Preferences::new()));
        storage
            .expect_modify()
            .returning(|_| Err(anyhow::anyhow!("disk full")));

        let store = SettingsStore::open(Box::new(storage));
        let subscription = store.subscribe();
        let _ = subscription.try_recv();

        let err = store
            .update(SettingUpdate::DarkTheme(true))
            .unwrap_err();
        let unavailable = err.downcast_ref::<PersistenceUnavailable>().unwrap();
        assert!(unavailable.reason.contains("disk full"));

        assert_eq!(store.read(), UserSettings::default());
        assert_eq!(subscription.try_recv(), None);
    }

    #[test]
    fn test_unreadable_storage_opens_with_defaults() {
        let mut storage = MockPreferenceStorage::new();
        storage
            .expect_load()
            .returning(|| Err(anyhow::anyhow!("permission denied")));

        let store = SettingsStore::open(Box::new(storage));
        assert_eq!(store.read(), UserSettings::default());
    }

    #[test]
    fn test_unchanged_update_does_not_notify() {
        let store = SettingsStore::open(Box::new(MemoryPreferenceStorage::new()));
        let subscription = store.subscribe();
        let _ = subscription.try_recv();

        store
            .update(SettingUpdate::TemperatureUnit(TemperatureUnit::Celsius))
            .unwrap();
        assert_eq!(subscription.try_recv(), None);
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let store = SettingsStore::open(Box::new(MemoryPreferenceStorage::new()));
        let kept = store.subscribe();
        drop(store.subscribe());
        assert_eq!(store.subscriber_count(), 2);

        store.update(SettingUpdate::SystemTheme(false)).unwrap();
        assert_eq!(store.subscriber_count(), 1);
        assert!(!kept.latest().unwrap().is_system_theme);
    }

    #[test]
    fn test_reload_publishes_external_changes_once() {
        let mut initial = Preferences::new();
        initial.insert("is_dark_theme".into(), true.into());
        let store = SettingsStore::open(Box::new(MemoryPreferenceStorage::with_preferences(
            initial,
        )));
        assert!(store.read().is_dark_theme);
        assert!(!store.reload().unwrap());
    }
}
