//! Lifecycle adapter binding foreign DOM widgets to declarative components.
//!
//! A wrapped component constructs a stateful widget from a vanilla-DOM widget
//! library against its rendered root node, wires the widget's events to
//! configured handlers, keeps hooks informed of prop changes, and releases
//! everything again on unmount.

pub mod adapter;
pub mod config;
pub mod listeners;
pub mod manifest;
pub mod props;
pub mod traits;

pub use adapter::{with_mdc, Adapter, AdapterError, Instance, Phase, Wrapped};
pub use config::{AdapterConfig, EventHandler, MountHook, UpdateHook};
pub use listeners::{ListenerRegistration, ListenerStack};
pub use manifest::{BindingKind, Bindings, Manifest, ManifestError, WidgetDef};
pub use props::{ApiRef, PropValue, Props, RootCapture, API_REF_PROP, ELEMENT_REF_PROP};
pub use traits::{Component, ComponentId, Listener, NodeResolver, WidgetConstructor, WidgetHandle};
