//! Declarative wrapper definitions.
//!
//! A manifest lists wrapped widgets in TOML. Callables are referred to by
//! name and looked up in a [`Bindings`] registry when a definition is
//! resolved into an [`AdapterConfig`]:
//!
//! ```toml
//! [[widget]]
//! name = "checkbox"
//! constructor = "MDCCheckbox"
//! element_ref = true
//! on_update = "sync_checked"
//!
//! [widget.events]
//! change = "on_change"
//!
//! [widget.defaults]
//! checked = false
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::adapter::{with_mdc, Adapter};
use crate::config::{AdapterConfig, EventHandler, MountHook, UpdateHook};
use crate::props::Props;
use crate::traits::{WidgetConstructor, WidgetHandle};

// Plain DOM events and namespaced widget events such as "MDCMenu:selected".
static EVENT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_.:-]*$").expect("Invalid event name regex")
});

/// Parsed manifest file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Manifest {
    /// Wrapper definitions in file order
    #[serde(default, rename = "widget")]
    pub widgets: Vec<WidgetDef>,
}

/// One wrapped widget.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WidgetDef {
    /// Unique wrapper name
    pub name: String,

    /// Binding name of the widget constructor
    #[serde(default)]
    pub constructor: Option<String>,

    /// Whether the presentational component reports its root node
    #[serde(default)]
    pub element_ref: bool,

    /// Event name to handler binding name
    #[serde(default)]
    pub events: BTreeMap<String, String>,

    /// Default props
    #[serde(default)]
    pub defaults: serde_json::Map<String, Value>,

    /// Binding name of the mount hook
    #[serde(default)]
    pub on_mount: Option<String>,

    /// Binding name of the update hook
    #[serde(default)]
    pub on_update: Option<String>,
}

impl Manifest {
    /// Parse and validate a manifest from TOML source.
    pub fn from_toml_str(source: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest =
            toml::from_str(source).map_err(|e| ManifestError::InvalidToml(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let source = fs::read_to_string(path)
            .map_err(|e| ManifestError::ReadError(path.display().to_string(), e.to_string()))?;
        let manifest = Self::from_toml_str(&source)?;
        tracing::info!(
            "Loaded {} widget definitions from {}",
            manifest.widgets.len(),
            path.display()
        );
        Ok(manifest)
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Option<&WidgetDef> {
        self.widgets.iter().find(|w| w.name == name)
    }

    /// All definition names in file order.
    pub fn names(&self) -> Vec<&str> {
        self.widgets.iter().map(|w| w.name.as_str()).collect()
    }

    /// Resolve a named definition into an adapter.
    pub fn adapter<W: WidgetHandle>(
        &self,
        name: &str,
        bindings: &Bindings<W>,
    ) -> Result<Adapter<W>, ManifestError> {
        let def = self
            .get(name)
            .ok_or_else(|| ManifestError::UnknownWidget(name.to_string()))?;
        Ok(with_mdc(bindings.resolve(def)?))
    }

    fn validate(&self) -> Result<(), ManifestError> {
        let mut seen = HashSet::new();
        for widget in &self.widgets {
            if !seen.insert(widget.name.as_str()) {
                return Err(ManifestError::DuplicateWidget(widget.name.clone()));
            }
            if let Some(event) = widget.events.keys().find(|e| !EVENT_NAME_RE.is_match(e)) {
                return Err(ManifestError::InvalidEventName {
                    widget: widget.name.clone(),
                    event: event.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Kind of callable a binding name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Constructor,
    Handler,
    MountHook,
    UpdateHook,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BindingKind::Constructor => "constructor",
            BindingKind::Handler => "event handler",
            BindingKind::MountHook => "mount hook",
            BindingKind::UpdateHook => "update hook",
        })
    }
}

/// Named callables that manifest entries refer to.
pub struct Bindings<W: WidgetHandle> {
    constructors: HashMap<String, WidgetConstructor<W>>,
    handlers: HashMap<String, EventHandler<W>>,
    mount_hooks: HashMap<String, MountHook>,
    update_hooks: HashMap<String, UpdateHook<W>>,
}

impl<W: WidgetHandle> Bindings<W> {
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
            handlers: HashMap::new(),
            mount_hooks: HashMap::new(),
            update_hooks: HashMap::new(),
        }
    }

    pub fn constructor(
        mut self,
        name: impl Into<String>,
        f: impl Fn(Option<&W::Node>) -> anyhow::Result<W> + 'static,
    ) -> Self {
        self.constructors.insert(name.into(), Rc::new(f));
        self
    }

    pub fn handler(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&W::Event, &Props<W>, Option<&W>) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.handlers.insert(name.into(), Rc::new(f));
        self
    }

    pub fn mount_hook(
        mut self,
        name: impl Into<String>,
        f: impl Fn() -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.mount_hooks.insert(name.into(), Rc::new(f));
        self
    }

    pub fn update_hook(
        mut self,
        name: impl Into<String>,
        f: impl Fn(Option<&Props<W>>, &Props<W>, Option<&W>) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.update_hooks.insert(name.into(), Rc::new(f));
        self
    }

    /// Build the configuration a definition describes.
    pub fn resolve(&self, def: &WidgetDef) -> Result<AdapterConfig<W>, ManifestError> {
        let mut config = AdapterConfig::new()
            .element_ref(def.element_ref)
            .default_props(def.defaults.clone());

        if let Some(name) = &def.constructor {
            config.constructor = Some(Rc::clone(lookup(
                &self.constructors,
                BindingKind::Constructor,
                name,
            )?));
        }
        for (event, name) in &def.events {
            let handler = lookup(&self.handlers, BindingKind::Handler, name)?;
            config = config.event_handler(event.as_str(), Rc::clone(handler));
        }
        if let Some(name) = &def.on_mount {
            config.on_mount = Some(Rc::clone(lookup(
                &self.mount_hooks,
                BindingKind::MountHook,
                name,
            )?));
        }
        if let Some(name) = &def.on_update {
            config.on_update = Some(Rc::clone(lookup(
                &self.update_hooks,
                BindingKind::UpdateHook,
                name,
            )?));
        }

        tracing::debug!("Resolved widget definition '{}'", def.name);
        Ok(config)
    }
}

impl<W: WidgetHandle> Default for Bindings<W> {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup<'a, T>(
    table: &'a HashMap<String, T>,
    kind: BindingKind,
    name: &str,
) -> Result<&'a T, ManifestError> {
    table.get(name).ok_or_else(|| ManifestError::UnknownBinding {
        kind,
        name: name.to_string(),
    })
}

/// Errors that can occur loading or resolving a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {0}: {1}")]
    ReadError(String, String),

    #[error("Invalid manifest TOML: {0}")]
    InvalidToml(String),

    #[error("Duplicate widget definition: {0}")]
    DuplicateWidget(String),

    #[error("Invalid event name '{event}' in widget '{widget}'")]
    InvalidEventName { widget: String, event: String },

    #[error("Widget not defined: {0}")]
    UnknownWidget(String),

    #[error("Unknown {kind} binding: {name}")]
    UnknownBinding { kind: BindingKind, name: String },
}
