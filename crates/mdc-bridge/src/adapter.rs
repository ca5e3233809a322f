//! The wrap factory and the per-instance lifecycle.
//!
//! [`with_mdc`] turns an [`AdapterConfig`] into an [`Adapter`], which wraps any
//! presentational [`Component`]. The host framework creates an [`Instance`] of
//! the wrapped component and drives it through `on_mount`,
//! `on_before_update` and `on_unmount`:
//!
//! ```text
//! Unmounted --on_mount--> Initializing --ok--> Active --on_unmount--> Unmounted
//!                              |                 |  ^
//!                              +--err--> Unmounted  +--on_before_update / reinitialize
//! ```
//!
//! Everything acquired while mounting (the widget and its listener
//! registrations) lives in one session, released by a single teardown
//! routine on unmount, on reinitialize, on a failed mount and on drop.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::config::{AdapterConfig, EventHandler};
use crate::listeners::ListenerStack;
use crate::props::{ApiRef, PropValue, Props, RootCapture, API_REF_PROP, ELEMENT_REF_PROP};
use crate::traits::{Component, ComponentId, Listener, NodeResolver, WidgetHandle};

/// Wrap components with the lifecycle described by `config`.
pub fn with_mdc<W: WidgetHandle>(config: AdapterConfig<W>) -> Adapter<W> {
    Adapter::new(config)
}

/// Errors raised by lifecycle operations.
///
/// Failures of user callbacks are carried unchanged as the error source.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("Widget construction failed: {0}")]
    Construct(#[source] anyhow::Error),

    #[error("Mount hook failed: {0}")]
    MountHook(#[source] anyhow::Error),

    #[error("Update hook failed: {0}")]
    UpdateHook(#[source] anyhow::Error),

    #[error("Invalid prop '{name}': expected an apiRef callback, found {found}")]
    InvalidProp { name: String, found: &'static str },

    #[error("Cannot {operation} while {phase}")]
    InvalidTransition {
        operation: &'static str,
        phase: Phase,
    },
}

/// Lifecycle phase of a wrapped instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unmounted,
    Initializing,
    Active,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Unmounted => "unmounted",
            Phase::Initializing => "initializing",
            Phase::Active => "active",
        })
    }
}

/// Factory produced by [`with_mdc`].
pub struct Adapter<W: WidgetHandle> {
    config: Rc<AdapterConfig<W>>,
}

impl<W: WidgetHandle> Adapter<W> {
    pub fn new(config: AdapterConfig<W>) -> Self {
        Self {
            config: Rc::new(config),
        }
    }

    /// Wrap a presentational component.
    pub fn wrap<C: Component<W>>(&self, component: C) -> Wrapped<W, C> {
        // `apiRef` defaults to a no-op; configured defaults may override it.
        let defaults = Props::new()
            .with(API_REF_PROP, ApiRef::noop())
            .merged(self.config.default_props.clone());

        Wrapped {
            config: Rc::clone(&self.config),
            component: Rc::new(component),
            defaults: Rc::new(defaults),
        }
    }
}

impl<W: WidgetHandle> Clone for Adapter<W> {
    fn clone(&self) -> Self {
        Self {
            config: Rc::clone(&self.config),
        }
    }
}

impl<W: WidgetHandle> fmt::Debug for Adapter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapter").field("config", &self.config).finish()
    }
}

/// A wrapped component type; instantiate it once per place it is rendered.
pub struct Wrapped<W: WidgetHandle, C> {
    config: Rc<AdapterConfig<W>>,
    component: Rc<C>,
    defaults: Rc<Props<W>>,
}

impl<W: WidgetHandle, C: Component<W>> Wrapped<W, C> {
    /// Default props: a no-op `apiRef` under the configured defaults.
    pub fn default_props(&self) -> &Props<W> {
        &self.defaults
    }

    /// Create an unmounted instance with `props` merged over the defaults.
    ///
    /// `resolver` is how the host finds the node the instance rendered.
    pub fn instantiate(
        &self,
        props: Props<W>,
        resolver: impl NodeResolver<W::Node> + 'static,
    ) -> Instance<W, C> {
        let id = ComponentId::next();
        tracing::debug!("Created component {}", id);

        Instance {
            id,
            config: Rc::clone(&self.config),
            component: Rc::clone(&self.component),
            defaults: Rc::clone(&self.defaults),
            resolver: Rc::new(resolver),
            props: Rc::new(RefCell::new(Rc::new(self.defaults.merged(props)))),
            capture: RootCapture::new(),
            phase: Phase::Unmounted,
            session: None,
        }
    }
}

impl<W: WidgetHandle, C> Clone for Wrapped<W, C> {
    fn clone(&self) -> Self {
        Self {
            config: Rc::clone(&self.config),
            component: Rc::clone(&self.component),
            defaults: Rc::clone(&self.defaults),
        }
    }
}

/// Resources held between mount and teardown.
struct Session<W: WidgetHandle> {
    root: Option<W::Node>,
    widget: Option<Rc<W>>,
    listeners: ListenerStack<W>,
}

impl<W: WidgetHandle> Session<W> {
    /// Unregister all listeners, then destroy the widget. Safe to repeat.
    fn teardown(&mut self) -> usize {
        let released = self.listeners.unregister_all();
        if let Some(widget) = self.widget.take() {
            widget.destroy();
        }
        self.root = None;
        released
    }
}

impl<W: WidgetHandle> Drop for Session<W> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// One mounted (or mountable) occurrence of a wrapped component.
pub struct Instance<W: WidgetHandle, C> {
    id: ComponentId,
    config: Rc<AdapterConfig<W>>,
    component: Rc<C>,
    defaults: Rc<Props<W>>,
    resolver: Rc<dyn NodeResolver<W::Node>>,

    /// Shared with wrapped listeners so they observe the props current at call time
    props: Rc<RefCell<Rc<Props<W>>>>,

    capture: RootCapture<W::Node>,
    phase: Phase,
    session: Option<Session<W>>,
}

impl<W: WidgetHandle, C: Component<W>> Instance<W, C> {
    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current props, defaults included.
    pub fn props(&self) -> Rc<Props<W>> {
        Rc::clone(&self.props.borrow())
    }

    /// The live widget, if mounted with a constructor.
    pub fn widget(&self) -> Option<Rc<W>> {
        self.session.as_ref().and_then(|s| s.widget.clone())
    }

    /// The root node resolved for the current mount cycle.
    pub fn root_node(&self) -> Option<W::Node> {
        self.session.as_ref().and_then(|s| s.root.clone())
    }

    /// Number of live listener registrations.
    pub fn listener_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.listeners.len())
    }

    /// The slot a presentational component reports its root node into.
    pub fn root_capture(&self) -> &RootCapture<W::Node> {
        &self.capture
    }

    /// Mount transition: construct the widget, run hooks, register listeners.
    pub fn on_mount(&mut self) -> Result<(), AdapterError> {
        self.expect_phase(Phase::Unmounted, "mount")?;
        tracing::debug!("Mounting component {}", self.id);

        self.phase = Phase::Initializing;
        match self.initialize() {
            Ok(session) => {
                self.session = Some(session);
                self.phase = Phase::Active;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Mount of component {} rolled back: {}", self.id, e);
                self.phase = Phase::Unmounted;
                Err(e)
            }
        }
    }

    /// Update transition: notify the update hook, then commit `next`.
    ///
    /// Listeners are not re-registered. When the hook fails the props stay as they were.
    pub fn on_before_update(&mut self, next: Props<W>) -> Result<(), AdapterError> {
        self.expect_phase(Phase::Active, "update")?;
        tracing::debug!("Updating component {}", self.id);

        let next = self.defaults.merged(next);
        let current = self.props();
        if let Some(hook) = &self.config.on_update {
            let widget = self.widget();
            hook(Some(&*current), &next, widget.as_deref()).map_err(AdapterError::UpdateHook)?;
        }

        *self.props.borrow_mut() = Rc::new(next);
        Ok(())
    }

    /// Unmount transition. A no-op when already unmounted.
    pub fn on_unmount(&mut self) {
        if self.phase == Phase::Unmounted {
            return;
        }
        tracing::debug!("Unmounting component {}", self.id);
        self.teardown();
        // The rendered tree goes away with the component; a later mount reports again.
        self.capture.clear();
    }

    /// Tear down and mount again with the current props.
    pub fn reinitialize(&mut self) -> Result<(), AdapterError> {
        self.expect_phase(Phase::Active, "reinitialize")?;
        tracing::debug!("Reinitializing component {}", self.id);

        self.teardown();
        self.on_mount()
    }

    /// Render the presentational component.
    pub fn render(&self) -> C::Output {
        self.component.render(&self.render_props())
    }

    /// Props forwarded to the presentational component: everything except
    /// `apiRef`, plus the root-capture callback when configured.
    pub fn render_props(&self) -> Props<W> {
        let mut forwarded = Props::new();
        if self.config.element_ref {
            forwarded.insert(
                ELEMENT_REF_PROP,
                PropValue::RootCapture(self.capture.clone()),
            );
        }
        forwarded.extend(self.props().without(API_REF_PROP));
        forwarded
    }

    fn initialize(&self) -> Result<Session<W>, AdapterError> {
        let mut session = Session {
            root: self.resolve_root(),
            widget: None,
            listeners: ListenerStack::new(),
        };
        let props = self.props();

        if let Some(constructor) = &self.config.constructor {
            let widget = constructor(session.root.as_ref()).map_err(AdapterError::Construct)?;
            let widget = Rc::new(widget);
            session.widget = Some(Rc::clone(&widget));

            let api_ref = props.api_ref().map_err(|found| AdapterError::InvalidProp {
                name: API_REF_PROP.to_string(),
                found,
            })?;
            if let Some(api_ref) = api_ref {
                api_ref.call(widget);
            }
        }

        if let Some(hook) = &self.config.on_mount {
            hook().map_err(AdapterError::MountHook)?;
        }

        for (event, handler) in &self.config.events {
            let listener = self.wrap_handler(handler, session.widget.as_ref());
            session
                .listeners
                .register(session.widget.as_ref(), event.as_str(), listener);
        }

        if let Some(hook) = &self.config.on_update {
            hook(None, &props, session.widget.as_deref()).map_err(AdapterError::UpdateHook)?;
        }

        tracing::debug!(
            "Mounted component {} ({} listeners, widget: {})",
            self.id,
            session.listeners.len(),
            session.widget.is_some()
        );
        Ok(session)
    }

    /// The single teardown path; leaves the instance unmounted.
    fn teardown(&mut self) {
        if let Some(mut session) = self.session.take() {
            let released = session.teardown();
            tracing::debug!("Released {} listeners of component {}", released, self.id);
        }
        self.phase = Phase::Unmounted;
    }

    /// Captured node first, otherwise whatever the host resolves.
    fn resolve_root(&self) -> Option<W::Node> {
        self.capture
            .get()
            .or_else(|| self.resolver.find_node(self.id))
    }

    /// Bind a configured handler to this instance's props and widget.
    fn wrap_handler(
        &self,
        handler: &EventHandler<W>,
        widget: Option<&Rc<W>>,
    ) -> Listener<W::Event> {
        let handler = Rc::clone(handler);
        let props = Rc::clone(&self.props);
        let widget: Option<Weak<W>> = widget.map(Rc::downgrade);

        Rc::new(move |event: &W::Event| -> anyhow::Result<()> {
            let current = Rc::clone(&props.borrow());
            let widget = widget.as_ref().and_then(Weak::upgrade);
            handler(event, &current, widget.as_deref())
        })
    }

    fn expect_phase(&self, expected: Phase, operation: &'static str) -> Result<(), AdapterError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(AdapterError::InvalidTransition {
                operation,
                phase: self.phase,
            })
        }
    }
}

impl<W: WidgetHandle, C> fmt::Debug for Instance<W, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("props", &self.props.borrow())
            .finish_non_exhaustive()
    }
}
