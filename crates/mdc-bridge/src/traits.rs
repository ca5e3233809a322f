//! Trait definitions for the foreign widget library and the host framework.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::props::Props;

/// A live instance of a foreign widget bound to one rendered node.
///
/// Handles are reference types on the foreign side (DOM bindings mutate
/// through shared references), so every method takes `&self`.
pub trait WidgetHandle: 'static {
    /// Rendered element type the widget attaches to.
    type Node: Clone + 'static;

    /// Payload delivered to event listeners.
    type Event: 'static;

    /// Attach `listener` to the named widget event.
    fn listen(&self, event: &str, listener: &Listener<Self::Event>);

    /// Detach a listener previously passed to [`WidgetHandle::listen`].
    ///
    /// Listeners are matched by `Rc` identity.
    fn unlisten(&self, event: &str, listener: &Listener<Self::Event>);

    /// Release everything the widget attached to its node.
    fn destroy(&self);
}

/// Callback handed to the foreign widget for one event name.
pub type Listener<E> = Rc<dyn Fn(&E) -> anyhow::Result<()>>;

/// Factory for a widget bound to a root node.
///
/// The node is `None` when no root could be resolved; whatever the foreign
/// constructor does with that is passed through unchanged.
pub type WidgetConstructor<W> =
    Rc<dyn Fn(Option<&<W as WidgetHandle>::Node>) -> anyhow::Result<W>>;

/// Identifier of one wrapped component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    /// Allocate a process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host-side strategy for finding the node a mounted instance rendered.
pub trait NodeResolver<N> {
    /// Resolve the root node of the mounted instance, if any.
    fn find_node(&self, component: ComponentId) -> Option<N>;
}

impl<N, F> NodeResolver<N> for F
where
    F: Fn(ComponentId) -> Option<N>,
{
    fn find_node(&self, component: ComponentId) -> Option<N> {
        self(component)
    }
}

/// A presentational component: turns props into the host's render output.
pub trait Component<W: WidgetHandle> {
    /// Whatever the host framework renders (an element tree, markup, ...).
    type Output;

    fn render(&self, props: &Props<W>) -> Self::Output;
}

impl<W, O, F> Component<W> for F
where
    W: WidgetHandle,
    F: Fn(&Props<W>) -> O,
{
    type Output = O;

    fn render(&self, props: &Props<W>) -> O {
        self(props)
    }
}
