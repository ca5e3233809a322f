//! Prop bags passed to wrapped and presentational components.
//!
//! Props are an ordered map from name to [`PropValue`]. Most values are plain
//! data; two names are reserved for callbacks the adapter understands:
//! [`API_REF_PROP`] receives the constructed widget, and [`ELEMENT_REF_PROP`]
//! carries the root-capture callback down to the presentational component.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::traits::WidgetHandle;

/// Prop that receives the widget handle once it is constructed.
pub const API_REF_PROP: &str = "apiRef";

/// Prop carrying the root-capture callback to the presentational component.
pub const ELEMENT_REF_PROP: &str = "mdcElementRef";

/// Callback receiving the constructed widget.
pub struct ApiRef<W>(Rc<dyn Fn(Rc<W>)>);

impl<W> ApiRef<W> {
    /// Wrap a callback.
    pub fn new(f: impl Fn(Rc<W>) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// A callback that ignores the widget.
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Hand the widget to the callback.
    pub fn call(&self, widget: Rc<W>) {
        (self.0)(widget)
    }

    /// Whether both refer to the same callback.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<W> Clone for ApiRef<W> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<W> fmt::Debug for ApiRef<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiRef(..)")
    }
}

/// Shared slot a presentational component reports its root node into.
pub struct RootCapture<N>(Rc<RefCell<Option<N>>>);

impl<N: Clone> RootCapture<N> {
    /// An empty slot.
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(None)))
    }

    /// Record `node` as the root and return it.
    pub fn capture(&self, node: N) -> N {
        *self.0.borrow_mut() = Some(node.clone());
        node
    }

    /// The most recently captured node.
    pub fn get(&self) -> Option<N> {
        self.0.borrow().clone()
    }

    /// Forget the captured node.
    pub fn clear(&self) {
        self.0.borrow_mut().take();
    }

    /// Whether both handles share one slot.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<N: Clone> Default for RootCapture<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Clone for RootCapture<N> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<N: fmt::Debug> fmt::Debug for RootCapture<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RootCapture").field(&self.0.borrow()).finish()
    }
}

/// A single prop value.
pub enum PropValue<W: WidgetHandle> {
    /// Plain data: `variant="raised"`, `checked={true}`
    Value(Value),
    /// Widget receiver: `apiRef={api => ...}`
    ApiRef(ApiRef<W>),
    /// Root-capture callback: `mdcElementRef={capture}`
    RootCapture(RootCapture<W::Node>),
}

impl<W: WidgetHandle> PropValue<W> {
    /// Get the data if this is a plain value.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            PropValue::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            PropValue::Value(_) => "value",
            PropValue::ApiRef(_) => "apiRef callback",
            PropValue::RootCapture(_) => "root-capture callback",
        }
    }
}

impl<W: WidgetHandle> Clone for PropValue<W> {
    fn clone(&self) -> Self {
        match self {
            PropValue::Value(v) => PropValue::Value(v.clone()),
            PropValue::ApiRef(r) => PropValue::ApiRef(r.clone()),
            PropValue::RootCapture(c) => PropValue::RootCapture(c.clone()),
        }
    }
}

/// Callbacks compare by identity.
impl<W: WidgetHandle> PartialEq for PropValue<W> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Value(a), PropValue::Value(b)) => a == b,
            (PropValue::ApiRef(a), PropValue::ApiRef(b)) => a.ptr_eq(b),
            (PropValue::RootCapture(a), PropValue::RootCapture(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl<W: WidgetHandle> fmt::Debug for PropValue<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Value(v) => write!(f, "{}", v),
            other => f.write_str(other.kind()),
        }
    }
}

impl<W: WidgetHandle> From<Value> for PropValue<W> {
    fn from(value: Value) -> Self {
        PropValue::Value(value)
    }
}

impl<W: WidgetHandle> From<ApiRef<W>> for PropValue<W> {
    fn from(api_ref: ApiRef<W>) -> Self {
        PropValue::ApiRef(api_ref)
    }
}

/// Ordered prop bag.
pub struct Props<W: WidgetHandle> {
    entries: BTreeMap<String, PropValue<W>>,
}

impl<W: WidgetHandle> Props<W> {
    /// An empty prop bag.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Build a prop bag from plain JSON data.
    pub fn from_json(map: serde_json::Map<String, Value>) -> Self {
        Self {
            entries: map
                .into_iter()
                .map(|(k, v)| (k, PropValue::Value(v)))
                .collect(),
        }
    }

    /// Builder form of [`Props::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropValue<W>>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a prop, returning the previous value.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<PropValue<W>>,
    ) -> Option<PropValue<W>> {
        self.entries.insert(name.into(), value.into())
    }

    /// Look up a prop.
    pub fn get(&self, name: &str) -> Option<&PropValue<W>> {
        self.entries.get(name)
    }

    /// Look up a plain data prop.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(PropValue::as_value)
    }

    /// Check if a prop is set.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prop names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue<W>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The `apiRef` callback, if one is set.
    ///
    /// Returns `Err` with the offending kind when the prop holds something else.
    pub fn api_ref(&self) -> Result<Option<&ApiRef<W>>, &'static str> {
        match self.get(API_REF_PROP) {
            None => Ok(None),
            Some(PropValue::ApiRef(r)) => Ok(Some(r)),
            Some(other) => Err(other.kind()),
        }
    }

    /// Plain data props as a JSON object; callbacks are skipped.
    pub fn data(&self) -> serde_json::Map<String, Value> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_value().map(|v| (k.clone(), v.clone())))
            .collect()
    }

    /// Copy every entry except `reserved`.
    pub fn without(&self, reserved: &str) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(k, _)| k.as_str() != reserved)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Overlay `props` on top of `self`, entries in `props` winning.
    pub fn merged(&self, props: Props<W>) -> Self {
        let mut entries = self.entries.clone();
        entries.extend(props.entries);
        Self { entries }
    }
}

impl<W: WidgetHandle> Default for Props<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: WidgetHandle> Clone for Props<W> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<W: WidgetHandle> PartialEq for Props<W> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<W: WidgetHandle> fmt::Debug for Props<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<W: WidgetHandle, K: Into<String>, V: Into<PropValue<W>>> FromIterator<(K, V)> for Props<W> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<W: WidgetHandle> Extend<(String, PropValue<W>)> for Props<W> {
    fn extend<I: IntoIterator<Item = (String, PropValue<W>)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl<W: WidgetHandle> IntoIterator for Props<W> {
    type Item = (String, PropValue<W>);
    type IntoIter = std::collections::btree_map::IntoIter<String, PropValue<W>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
