//! Observable settings store.
//!
//! The site's tunable state (background shader tuning, maintenance banner)
//! used to live in implicit module-level globals; here it is an explicit
//! store passed by reference, with subscriber notification so the UI layer
//! can react to `admin` toggles without polling.

use std::cell::RefCell;

/// Tuning for the animated Perlin-noise background.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundTuning {
    pub octaves: u8,
    pub frequency: f32,
    pub speed: f32,
    pub intensity: f32,
}

impl Default for BackgroundTuning {
    fn default() -> Self {
        Self {
            octaves: 4,
            frequency: 0.8,
            speed: 0.15,
            intensity: 0.6,
        }
    }
}

/// Site-wide tunable state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub background: BackgroundTuning,
    /// Shown across the site while the owner is doing maintenance.
    pub maintenance_banner: bool,
    /// Whether new-message alert dispatches are enabled.
    pub alerts_enabled: bool,
}

type Subscriber = Box<dyn Fn(&Settings)>;

/// Explicit, observable settings container.
///
/// Single-threaded by design, like the rest of the shell session state.
pub struct SettingsStore {
    current: RefCell<Settings>,
    subscribers: RefCell<Vec<Subscriber>>,
}

impl SettingsStore {
    pub fn new(initial: Settings) -> Self {
        Self {
            current: RefCell::new(initial),
            subscribers: RefCell::new(Vec::new()),
        }
    }

    /// Snapshot of the current settings.
    pub fn get(&self) -> Settings {
        self.current.borrow().clone()
    }

    /// Register a callback invoked after every committed update.
    pub fn subscribe(&self, f: impl Fn(&Settings) + 'static) {
        self.subscribers.borrow_mut().push(Box::new(f));
    }

    /// Apply a mutation and notify all subscribers with the new state.
    pub fn update(&self, f: impl FnOnce(&mut Settings)) {
        let snapshot = {
            let mut current = self.current.borrow_mut();
            f(&mut current);
            current.clone()
        };
        for sub in self.subscribers.borrow().iter() {
            sub(&snapshot);
        }
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn update_mutates_snapshot() {
        let store = SettingsStore::default();
        store.update(|s| s.maintenance_banner = true);
        assert!(store.get().maintenance_banner);
    }

    #[test]
    fn subscribers_are_notified() {
        let store = SettingsStore::default();
        let seen = Rc::new(Cell::new(0u32));
        let seen_clone = Rc::clone(&seen);
        store.subscribe(move |s| {
            if s.alerts_enabled {
                seen_clone.set(seen_clone.get() + 1);
            }
        });
        store.update(|s| s.alerts_enabled = true);
        store.update(|s| s.background.speed = 0.3);
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn subscriber_sees_committed_state() {
        let store = SettingsStore::default();
        let observed = Rc::new(Cell::new(0.0f32));
        let observed_clone = Rc::clone(&observed);
        store.subscribe(move |s| observed_clone.set(s.background.frequency));
        store.update(|s| s.background.frequency = 1.25);
        assert_eq!(observed.get(), 1.25);
    }

    #[test]
    fn get_does_not_alias_internal_state() {
        let store = SettingsStore::default();
        let mut snapshot = store.get();
        snapshot.maintenance_banner = true;
        assert!(!store.get().maintenance_banner);
    }
}
