//! Adapter configuration supplied at wrap time.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::props::{PropValue, Props};
use crate::traits::{WidgetConstructor, WidgetHandle};

/// Event handler; receives the event, the props current at call time and the widget.
pub type EventHandler<W> = Rc<
    dyn Fn(&<W as WidgetHandle>::Event, &Props<W>, Option<&W>) -> anyhow::Result<()>,
>;

/// Called once per mount, after the widget is constructed.
pub type MountHook = Rc<dyn Fn() -> anyhow::Result<()>>;

/// Called with (previous props, next props, widget). Previous props are `None`
/// on the call made during mount.
pub type UpdateHook<W> =
    Rc<dyn Fn(Option<&Props<W>>, &Props<W>, Option<&W>) -> anyhow::Result<()>>;

/// Immutable configuration shared by every instance of a wrapped component.
pub struct AdapterConfig<W: WidgetHandle> {
    /// Foreign widget factory; without one the adapter is a lifecycle shim
    pub(crate) constructor: Option<WidgetConstructor<W>>,

    /// Event name to handler, unique names, registration order
    pub(crate) events: Vec<(String, EventHandler<W>)>,

    /// Pass a root-capture callback to the presentational component
    pub(crate) element_ref: bool,

    /// Merged underneath user props
    pub(crate) default_props: Props<W>,

    pub(crate) on_mount: Option<MountHook>,

    pub(crate) on_update: Option<UpdateHook<W>>,
}

impl<W: WidgetHandle> AdapterConfig<W> {
    /// An empty configuration: no widget, no events, no hooks.
    pub fn new() -> Self {
        Self {
            constructor: None,
            events: Vec::new(),
            element_ref: false,
            default_props: Props::new(),
            on_mount: None,
            on_update: None,
        }
    }

    /// Set the widget constructor.
    pub fn constructor(
        mut self,
        f: impl Fn(Option<&W::Node>) -> anyhow::Result<W> + 'static,
    ) -> Self {
        self.constructor = Some(Rc::new(f));
        self
    }

    /// Add an event handler. A name that is already present keeps its
    /// position and gets the new handler.
    pub fn event(
        self,
        name: impl Into<String>,
        handler: impl Fn(&W::Event, &Props<W>, Option<&W>) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.event_handler(name, Rc::new(handler))
    }

    pub(crate) fn event_handler(
        mut self,
        name: impl Into<String>,
        handler: EventHandler<W>,
    ) -> Self {
        let name = name.into();
        match self.events.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = handler,
            None => self.events.push((name, handler)),
        }
        self
    }

    /// Ask for the root-capture prop to be passed to the presentational component.
    pub fn element_ref(mut self, enabled: bool) -> Self {
        self.element_ref = enabled;
        self
    }

    /// Add a single default prop.
    pub fn default_prop(mut self, name: impl Into<String>, value: impl Into<PropValue<W>>) -> Self {
        self.default_props.insert(name, value);
        self
    }

    /// Add default props from a JSON object; later entries win.
    pub fn default_props(mut self, defaults: serde_json::Map<String, Value>) -> Self {
        self.default_props.extend(
            defaults
                .into_iter()
                .map(|(k, v)| (k, PropValue::Value(v))),
        );
        self
    }

    pub fn on_mount(mut self, hook: impl Fn() -> anyhow::Result<()> + 'static) -> Self {
        self.on_mount = Some(Rc::new(hook));
        self
    }

    pub fn on_update(
        mut self,
        hook: impl Fn(Option<&Props<W>>, &Props<W>, Option<&W>) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.on_update = Some(Rc::new(hook));
        self
    }

    /// Check if a widget constructor is configured.
    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    /// Configured event names in registration order.
    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|(name, _)| name.as_str())
    }

    pub fn uses_element_ref(&self) -> bool {
        self.element_ref
    }

    pub fn defaults(&self) -> &Props<W> {
        &self.default_props
    }
}

impl<W: WidgetHandle> Default for AdapterConfig<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: WidgetHandle> fmt::Debug for AdapterConfig<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("constructor", &self.constructor.is_some())
            .field("events", &self.event_names().collect::<Vec<_>>())
            .field("element_ref", &self.element_ref)
            .field("default_props", &self.default_props)
            .field("on_mount", &self.on_mount.is_some())
            .field("on_update", &self.on_update.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::traits::Listener;

    struct Inert;

    impl WidgetHandle for Inert {
        type Node = ();
        type Event = ();

        fn listen(&self, _: &str, _: &Listener<()>) {}
        fn unlisten(&self, _: &str, _: &Listener<()>) {}
        fn destroy(&self) {}
    }

    #[test]
    fn replaces_duplicate_event_in_place() {
        let config = AdapterConfig::<Inert>::new()
            .event("open", |_, _, _| Ok(()))
            .event("close", |_, _, _| Ok(()))
            .event("open", |_, _, _| anyhow::bail!("replaced"));

        assert_eq!(config.event_names().collect::<Vec<_>>(), vec!["open", "close"]);

        let (_, handler) = &config.events[0];
        assert!(handler(&(), &Props::new(), None).is_err());
    }

    #[test]
    fn collects_default_props() {
        let config = AdapterConfig::<Inert>::new()
            .default_prop("x", json!(1))
            .default_props(json!({ "x": 5, "dense": true }).as_object().cloned().unwrap());

        assert_eq!(config.defaults().value("x"), Some(&json!(5)));
        assert_eq!(config.defaults().value("dense"), Some(&json!(true)));
    }

    #[test]
    fn starts_empty() {
        let config = AdapterConfig::<Inert>::default();
        assert!(!config.has_constructor());
        assert!(!config.uses_element_ref());
        assert_eq!(config.event_names().count(), 0);
        assert!(config.defaults().is_empty());
    }
}
