//! Per-state actor registry: a flat list plus per-layer buckets.
//!
//! Both indices are spliced under one lock that is released before any
//! actor hook runs. Passes walk a snapshot, so hooks may add or destroy
//! actors (including themselves) mid-pass.

use super::body::ActorId;
use super::Actor;
use log::{debug, warn};
use parking_lot::{Mutex, MutexGuard};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Type-erased shared actor.
pub type ActorRef = Arc<Mutex<dyn Actor>>;

/// Typed handle to a registered actor.
pub struct ActorHandle<A> {
    id: ActorId,
    actor: Arc<Mutex<A>>,
}

impl<A> ActorHandle<A> {
    /// Id injected at registration.
    #[inline]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Lock the actor.
    ///
    /// Blocks while a registry pass is running this actor's hook.
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, A> {
        self.actor.lock()
    }

    /// Run `f` with the actor locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
        f(&mut self.actor.lock())
    }
}

impl<A> Clone for ActorHandle<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            actor: Arc::clone(&self.actor),
        }
    }
}

impl<A> fmt::Debug for ActorHandle<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorHandle").field("id", &self.id).finish()
    }
}

#[derive(Clone)]
struct Entry {
    id: ActorId,
    layer: u32,
    alive: Arc<AtomicBool>,
    actor: ActorRef,
}

#[derive(Default)]
struct Index {
    actors: Vec<Entry>,
    layers: BTreeMap<u32, Vec<Entry>>,
    /// Destroyed while their own hook was running.
    pending_cleanup: Vec<ActorRef>,
    closed: bool,
}

/// Actors of one state generation.
///
/// Cloning is cheap and yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct ActorRegistry {
    index: Arc<Mutex<Index>>,
}

impl fmt::Debug for ActorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index = self.index.lock();
        f.debug_struct("ActorRegistry")
            .field("actors", &index.actors.len())
            .field("layers", &index.layers.len())
            .field("closed", &index.closed)
            .finish()
    }
}

impl ActorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the actor built by `make` under `layer`.
    ///
    /// `make` receives the new id; the actor's `init` runs synchronously
    /// before it is visible to any pass. On a torn-down registry the actor
    /// is built but neither initialized nor registered.
    pub fn add<A, F>(&self, layer: u32, make: F) -> ActorHandle<A>
    where
        A: Actor,
        F: FnOnce(ActorId) -> A,
    {
        let id = ActorId::next();
        let actor = Arc::new(Mutex::new(make(id)));
        let handle = ActorHandle {
            id,
            actor: Arc::clone(&actor),
        };

        if self.is_closed() {
            warn!("{id} not added: its state was popped");
            return handle;
        }

        actor.lock().init();

        let shared: ActorRef = actor;
        let entry = Entry {
            id,
            layer,
            alive: Arc::new(AtomicBool::new(true)),
            actor: shared,
        };
        let mut index = self.index.lock();
        if index.closed {
            drop(index);
            entry.actor.lock().cleanup();
            return handle;
        }
        index.actors.push(entry.clone());
        index.layers.entry(layer).or_default().push(entry);
        debug!("{id} added to layer {layer}");
        handle
    }

    /// Remove an actor from the flat list and its layer, then run its
    /// `cleanup` exactly once.
    ///
    /// Returns `false` (and does nothing) if `id` is not registered.
    pub fn destroy(&self, id: ActorId) -> bool {
        let entry = {
            let mut index = self.index.lock();
            let Some(position) = index.actors.iter().position(|e| e.id == id) else {
                return false;
            };
            let entry = index.actors.remove(position);
            if let Some(bucket) = index.layers.get_mut(&entry.layer) {
                bucket.retain(|e| e.id != id);
                if bucket.is_empty() {
                    index.layers.remove(&entry.layer);
                }
            }
            entry
        };
        entry.alive.store(false, Ordering::Release);
        self.cleanup_or_defer(&entry.actor);
        debug!("{id} destroyed");
        true
    }

    fn cleanup_or_defer(&self, actor: &ActorRef) {
        // Locked means one of its hooks is running; cleanup waits for the
        // end of the current pass.
        let locked = actor.try_lock();
        match locked {
            Some(mut actor) => actor.cleanup(),
            None => self.index.lock().pending_cleanup.push(Arc::clone(actor)),
        }
    }

    fn flush_pending(&self) {
        let pending = std::mem::take(&mut self.index.lock().pending_cleanup);
        for actor in pending {
            actor.lock().cleanup();
        }
    }

    /// Look up a registered actor by id.
    pub fn find(&self, id: ActorId) -> Option<ActorRef> {
        self.index
            .lock()
            .actors
            .iter()
            .find(|e| e.id == id)
            .map(|e| Arc::clone(&e.actor))
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: ActorId) -> bool {
        self.index.lock().actors.iter().any(|e| e.id == id)
    }

    /// Number of registered actors.
    pub fn len(&self) -> usize {
        self.index.lock().actors.len()
    }

    /// Whether no actor is registered.
    pub fn is_empty(&self) -> bool {
        self.index.lock().actors.is_empty()
    }

    /// Ids in registration order.
    pub fn ids(&self) -> Vec<ActorId> {
        self.index.lock().actors.iter().map(|e| e.id).collect()
    }

    /// Ids registered under `layer`, in registration order.
    pub fn layer(&self, layer: u32) -> Vec<ActorId> {
        self.index
            .lock()
            .layers
            .get(&layer)
            .map(|bucket| bucket.iter().map(|e| e.id).collect())
            .unwrap_or_default()
    }

    /// Non-empty layers, ascending.
    pub fn layers(&self) -> Vec<u32> {
        self.index.lock().layers.keys().copied().collect()
    }

    /// Step every actor once, in registration order.
    pub fn step_all(&self) {
        let snapshot = self.index.lock().actors.clone();
        for entry in &snapshot {
            if entry.alive.load(Ordering::Acquire) {
                entry.actor.lock().step();
            }
        }
        self.flush_pending();
    }

    /// Render every actor: layers ascending, registration order within a
    /// layer.
    pub fn render_all(&self, delta: f32) {
        let snapshot: Vec<Entry> = self
            .index
            .lock()
            .layers
            .values()
            .flat_map(|bucket| bucket.iter().cloned())
            .collect();
        for entry in &snapshot {
            if entry.alive.load(Ordering::Acquire) {
                entry.actor.lock().render(delta);
            }
        }
        self.flush_pending();
    }

    /// Destroy every actor and refuse new ones.
    pub fn teardown(&self) {
        let actors = {
            let mut index = self.index.lock();
            index.closed = true;
            index.layers.clear();
            std::mem::take(&mut index.actors)
        };
        for entry in &actors {
            entry.alive.store(false, Ordering::Release);
            self.cleanup_or_defer(&entry.actor);
        }
        self.flush_pending();
        if !actors.is_empty() {
            debug!("tore down {} actors", actors.len());
        }
    }

    /// Whether the registry has been torn down.
    pub fn is_closed(&self) -> bool {
        self.index.lock().closed
    }
}
