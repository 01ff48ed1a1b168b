//! KeyboardRegistrationManager: keyboard handler table keyed by event type and
//! accelerator.
//!
//! - Handlers are stored per `(KeyEventType, accelerator)` cell in
//!   registration order
//! - Every `add_handler` call gets its own registration id, so its
//!   [`Deregistration`] only ever removes the entries that call created
//! - Lookups hand out owned copies of the handler list
//! - Dispatch snapshots the list and releases the table lock before running
//!   handlers, so handlers may add or remove registrations freely

use std::fmt;
use std::sync::{Arc, Weak};

use ahash::AHashMap;
use compact_str::CompactString;
use enum_map::EnumMap;
use parking_lot::Mutex;
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::event_type::KeyEventType;
use crate::error::KeyboardError;

/// Shared keyboard handler. Identity is the `Arc` allocation.
pub type KeyHandler<E> = Arc<dyn Fn(&E) -> anyhow::Result<()> + Send + Sync>;

/// Wrap a closure as a [`KeyHandler`].
pub fn key_handler<E, F>(f: F) -> KeyHandler<E>
where
    F: Fn(&E) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

type RegistrationId = u64;

type AcceleratorList = SmallVec<[CompactString; 2]>;

struct HandlerEntry<E> {
    registration: RegistrationId,
    handler: KeyHandler<E>,
}

struct RegistrationTable<E> {
    cells: EnumMap<KeyEventType, AHashMap<CompactString, Vec<HandlerEntry<E>>>>,
    next_registration: RegistrationId,
}

impl<E> RegistrationTable<E> {
    fn new() -> Self {
        Self {
            cells: EnumMap::default(),
            next_registration: 1,
        }
    }

    fn remove_registration(
        &mut self,
        event_type: KeyEventType,
        accelerators: &[CompactString],
        registration: RegistrationId,
    ) -> usize {
        let cells = &mut self.cells[event_type];
        let mut removed = 0;

        for accelerator in accelerators {
            if let Some(entries) = cells.get_mut(accelerator) {
                let before = entries.len();
                entries.retain(|entry| entry.registration != registration);
                removed += before - entries.len();

                if entries.is_empty() {
                    cells.remove(accelerator);
                }
            }
        }

        removed
    }
}

/// Revokes exactly the entries created by one `add_handler` call.
///
/// Only the first call to [`Deregistration::deregister`] has an effect. The
/// capability holds a weak reference to the table; once the owning manager is
/// gone it does nothing.
pub struct Deregistration {
    revoke: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Deregistration {
    fn new(revoke: Box<dyn FnOnce() + Send>) -> Self {
        Self {
            revoke: Mutex::new(Some(revoke)),
        }
    }

    /// Remove the entries this registration created. Idempotent.
    pub fn deregister(&self) {
        let revoke = self.revoke.lock().take();
        if let Some(revoke) = revoke {
            revoke();
        }
    }

    /// `false` once `deregister` has been called
    pub fn is_active(&self) -> bool {
        self.revoke.lock().is_some()
    }
}

impl fmt::Debug for Deregistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deregistration")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Registration table for keyboard handlers of event payload `E`.
pub struct KeyboardRegistrationManager<E> {
    table: Arc<Mutex<RegistrationTable<E>>>,
}

impl<E: 'static> KeyboardRegistrationManager<E> {
    /// Create new empty registration manager
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(RegistrationTable::new())),
        }
    }

    /// Register `handler` for every accelerator in `accelerators` under
    /// `event_type`.
    ///
    /// Duplicate accelerators each get their own entry. An empty accelerator
    /// list registers nothing and yields an inert deregistration.
    pub fn add_handler<I, S>(
        &self,
        event_type: KeyEventType,
        accelerators: I,
        handler: KeyHandler<E>,
    ) -> Deregistration
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let accelerators: AcceleratorList = accelerators
            .into_iter()
            .map(|accelerator| CompactString::new(accelerator.as_ref()))
            .collect();

        let registration = {
            let mut table = self.table.lock();
            let registration = table.next_registration;
            table.next_registration += 1;

            let cells = &mut table.cells[event_type];
            for accelerator in &accelerators {
                cells
                    .entry(accelerator.clone())
                    .or_default()
                    .push(HandlerEntry {
                        registration,
                        handler: Arc::clone(&handler),
                    });
            }

            registration
        };

        debug!(
            registration,
            %event_type,
            accelerators = ?accelerators,
            "Registered keyboard handler"
        );

        let table: Weak<Mutex<RegistrationTable<E>>> = Arc::downgrade(&self.table);

        Deregistration::new(Box::new(move || {
            let Some(table) = table.upgrade() else {
                trace!(registration, "Registration outlived its manager");
                return;
            };

            let removed = table
                .lock()
                .remove_registration(event_type, &accelerators, registration);

            debug!(
                registration,
                %event_type,
                removed,
                "Deregistered keyboard handler"
            );
        }))
    }

    /// Handlers for the exact `(event_type, accelerator)` cell in registration
    /// order. Unregistered cells yield an empty list.
    pub fn get_handlers(&self, event_type: KeyEventType, accelerator: &str) -> Vec<KeyHandler<E>> {
        self.table.lock().cells[event_type]
            .get(accelerator)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| Arc::clone(&entry.handler))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Run every handler of the cell with `event`, in registration order.
    ///
    /// Returns the number of handlers that ran. The first failing handler
    /// stops the dispatch and its error is returned.
    pub fn invoke_handlers(
        &self,
        event_type: KeyEventType,
        accelerator: &str,
        event: &E,
    ) -> Result<usize, KeyboardError> {
        let handlers = self.get_handlers(event_type, accelerator);

        if handlers.is_empty() {
            trace!(%event_type, accelerator, "No keyboard handlers registered");
            return Ok(0);
        }

        trace!(
            %event_type,
            accelerator,
            count = handlers.len(),
            "Invoking keyboard handlers"
        );

        for handler in &handlers {
            handler(event).map_err(|source| {
                KeyboardError::handler_failed(event_type, accelerator, source)
            })?;
        }

        Ok(handlers.len())
    }

    /// Number of handlers in one cell
    pub fn handler_count(&self, event_type: KeyEventType, accelerator: &str) -> usize {
        self.table.lock().cells[event_type]
            .get(accelerator)
            .map_or(0, Vec::len)
    }

    /// Accelerators with at least one handler under `event_type`, sorted
    pub fn accelerators(&self, event_type: KeyEventType) -> Vec<CompactString> {
        let mut accelerators: Vec<CompactString> =
            self.table.lock().cells[event_type].keys().cloned().collect();
        accelerators.sort_unstable();
        accelerators
    }

    /// Total number of handler entries across all cells
    pub fn entry_count(&self) -> usize {
        self.table
            .lock()
            .cells
            .values()
            .flat_map(|cells| cells.values())
            .map(Vec::len)
            .sum()
    }

    /// Check if any handlers are registered
    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Drop every entry. Outstanding deregistrations become no-ops.
    pub fn clear(&self) {
        let mut table = self.table.lock();
        for cells in table.cells.values_mut() {
            cells.clear();
        }
        debug!("Cleared keyboard registration table");
    }
}

impl<E: 'static> Default for KeyboardRegistrationManager<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for KeyboardRegistrationManager<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.lock();
        let cell_count: usize = table.cells.values().map(|cells| cells.len()).sum();

        f.debug_struct("KeyboardRegistrationManager")
            .field("cell_count", &cell_count)
            .field("next_registration", &table.next_registration)
            .finish()
    }
}
