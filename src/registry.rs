/*
 * Handle registry: routes callbacks that only carry an opaque native handle
 * back to the owning widget object. Stored as an arena (slotmap) plus a
 * handle index. Entries are non-owning; the application owns its widgets and
 * a widget removes its entry when it is disposed.
 *
 * The registry is owned by the toolkit context and touched only on the
 * event-loop thread.
 */

use crate::error::{PlatformError, Result as PlatformResult};
use crate::types::WidgetHandle;
use crate::widget::Control;

use slotmap::{SlotMap, new_key_type};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

new_key_type! {
    /// Arena index of one registered widget.
    pub struct WidgetKey;
}

struct RegistryEntry {
    handle: WidgetHandle,
    control: Weak<dyn Control>,
}

#[derive(Default)]
pub struct HandleRegistry {
    entries: SlotMap<WidgetKey, RegistryEntry>,
    by_handle: HashMap<WidgetHandle, WidgetKey>,
}

impl std::fmt::Debug for HandleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleRegistry")
            .field("handles", &self.by_handle.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /*
     * Binds `handle` to `control`. A handle still bound to a live object is
     * rejected; an entry whose object is already gone is replaced, since the
     * platform may reuse handle values after destruction.
     */
    pub fn insert(
        &mut self,
        handle: WidgetHandle,
        control: Weak<dyn Control>,
    ) -> PlatformResult<WidgetKey> {
        if handle.is_null() {
            return Err(PlatformError::InvalidHandle(
                "cannot register a null handle".into(),
            ));
        }

        if let Some(&key) = self.by_handle.get(&handle) {
            let live = self
                .entries
                .get(key)
                .is_some_and(|entry| entry.control.strong_count() > 0);
            if live {
                return Err(PlatformError::OperationFailed(format!(
                    "handle {handle} is already registered to a live widget"
                )));
            }
            log::warn!("HandleRegistry: replacing stale entry for handle {handle}");
            self.entries.remove(key);
        }

        let key = self.entries.insert(RegistryEntry { handle, control });
        self.by_handle.insert(handle, key);
        log::debug!("HandleRegistry: registered handle {handle} ({} live)", self.len());
        Ok(key)
    }

    /// Removes the entry for `handle`. Returns `false` if none existed.
    pub fn remove(&mut self, handle: WidgetHandle) -> bool {
        match self.by_handle.remove(&handle) {
            Some(key) => {
                self.entries.remove(key);
                log::debug!("HandleRegistry: unregistered handle {handle}");
                true
            }
            None => false,
        }
    }

    /// Resolves `handle` to its widget, if one is registered and still alive.
    pub fn lookup(&self, handle: WidgetHandle) -> Option<Rc<dyn Control>> {
        let key = self.by_handle.get(&handle)?;
        self.entries.get(*key)?.control.upgrade()
    }

    pub fn key_of(&self, handle: WidgetHandle) -> Option<WidgetKey> {
        self.by_handle.get(&handle).copied()
    }

    pub fn handle_of(&self, key: WidgetKey) -> Option<WidgetHandle> {
        self.entries.get(key).map(|entry| entry.handle)
    }

    pub fn contains(&self, handle: WidgetHandle) -> bool {
        self.by_handle.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
