//! Lifecycle events fired by the repository layer.
//!
//! The bus is an explicit app-context object owned by the repository: it
//! records every dispatched event (so tests can assert on ordering) and
//! notifies any registered listeners synchronously.

/// A lifecycle event. `Created` events fire only when a handle did not
/// previously exist in the store; every save also fires `Saved`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    CollectionCreated { handle: String },
    CollectionSaved { handle: String },
    CollectionDeleted { handle: String },
    GlobalSetSaved { handle: String },
    GlobalSetDeleted { handle: String },
    TaxonomyCreated { handle: String },
    TaxonomySaved { handle: String },
    TaxonomyDeleted { handle: String },
}

type Listener = Box<dyn Fn(&Event)>;

#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
    log: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl Fn(&Event) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn dispatch(&mut self, event: Event) {
        for listener in &self.listeners {
            listener(&event);
        }
        self.log.push(event);
    }

    /// Every event dispatched so far, in order.
    pub fn log(&self) -> &[Event] {
        &self.log
    }

    pub fn clear(&mut self) {
        self.log.clear();
    }
}
