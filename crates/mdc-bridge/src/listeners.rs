//! Listener registrations and their teardown stack.

use std::fmt;
use std::rc::{Rc, Weak};

use crate::traits::{Listener, WidgetHandle};

/// A listener attached to a widget event, together with the means to detach it.
pub struct ListenerRegistration<W: WidgetHandle> {
    /// Widget event name (e.g., "MDCMenu:selected")
    event: String,

    /// The exact listener handed to `listen`
    listener: Listener<W::Event>,

    /// Widget the listener was attached to, if one existed; checked again on detach
    widget: Option<Weak<W>>,
}

impl<W: WidgetHandle> ListenerRegistration<W> {
    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn listener(&self) -> &Listener<W::Event> {
        &self.listener
    }

    /// Detach the listener. Consuming `self` makes this happen at most once.
    fn unregister(self) {
        if let Some(widget) = self.widget.as_ref().and_then(Weak::upgrade) {
            widget.unlisten(&self.event, &self.listener);
        }
        tracing::trace!("Unregistered listener for '{}'", self.event);
    }
}

impl<W: WidgetHandle> fmt::Debug for ListenerRegistration<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("event", &self.event)
            .field("attached", &self.widget.as_ref().is_some_and(|w| w.strong_count() > 0))
            .finish()
    }
}

/// Registrations in the order they were made; only ever unwound as a whole.
pub struct ListenerStack<W: WidgetHandle> {
    entries: Vec<ListenerRegistration<W>>,
}

impl<W: WidgetHandle> ListenerStack<W> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Attach `listener` to `widget` (when there is one) and record the registration.
    ///
    /// Without a widget, or once the widget is gone, detaching is a no-op.
    pub fn register(
        &mut self,
        widget: Option<&Rc<W>>,
        event: impl Into<String>,
        listener: Listener<W::Event>,
    ) -> &ListenerRegistration<W> {
        let event = event.into();
        if let Some(widget) = widget {
            widget.listen(&event, &listener);
        }
        tracing::trace!("Registered listener for '{}'", event);

        self.entries.push(ListenerRegistration {
            event,
            listener,
            widget: widget.map(Rc::downgrade),
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Detach every listener, most recent first, and clear the stack.
    ///
    /// Returns the number of registrations released.
    pub fn unregister_all(&mut self) -> usize {
        let count = self.entries.len();
        while let Some(registration) = self.entries.pop() {
            registration.unregister();
        }
        count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<W: WidgetHandle> Default for ListenerStack<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: WidgetHandle> fmt::Debug for ListenerStack<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}
