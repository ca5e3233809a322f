//! Test doubles: a recording widget, fake nodes and a fake host resolver.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mdc_bridge::{ComponentId, Listener, Props, WidgetHandle};
use serde_json::Value;

/// Stand-in for a rendered DOM element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeNode(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub struct FakeEvent {
    pub detail: Value,
}

/// Everything observable that happened, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Construct(Option<FakeNode>),
    Listen {
        widget: u32,
        event: String,
        listener: usize,
    },
    Unlisten {
        widget: u32,
        event: String,
        listener: usize,
    },
    Destroy(u32),
    ApiRef(u32),
    Mount,
    Update {
        previous: Option<Value>,
        next: Value,
        widget: Option<u32>,
    },
    Handled {
        event: String,
        props: Value,
        widget: Option<u32>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Call>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.borrow().iter().filter(|c| pred(*c)).count()
    }

    /// Listener key of the n-th `Listen` call.
    pub fn listen_key(&self, n: usize) -> usize {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Listen { listener, .. } => Some(*listener),
                _ => None,
            })
            .nth(n)
            .expect("no such listen call")
    }
}

pub fn listener_key(listener: &Listener<FakeEvent>) -> usize {
    Rc::as_ptr(listener) as *const () as usize
}

/// Widget that records every call into a journal.
pub struct FakeWidget {
    pub serial: u32,
    pub node: Option<FakeNode>,
    journal: Journal,
    listeners: RefCell<Vec<(String, Listener<FakeEvent>)>>,
    destroyed: Cell<bool>,
}

impl FakeWidget {
    /// Dispatch an event to every listener attached under `event`.
    pub fn emit(&self, event: &str, detail: Value) -> anyhow::Result<()> {
        let targets: Vec<Listener<FakeEvent>> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, l)| Rc::clone(l))
            .collect();

        let payload = FakeEvent { detail };
        for listener in targets {
            listener(&payload)?;
        }
        Ok(())
    }

    pub fn attached(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }
}

impl WidgetHandle for FakeWidget {
    type Node = FakeNode;
    type Event = FakeEvent;

    fn listen(&self, event: &str, listener: &Listener<FakeEvent>) {
        self.journal.push(Call::Listen {
            widget: self.serial,
            event: event.to_string(),
            listener: listener_key(listener),
        });
        self.listeners
            .borrow_mut()
            .push((event.to_string(), Rc::clone(listener)));
    }

    fn unlisten(&self, event: &str, listener: &Listener<FakeEvent>) {
        self.journal.push(Call::Unlisten {
            widget: self.serial,
            event: event.to_string(),
            listener: listener_key(listener),
        });
        self.listeners
            .borrow_mut()
            .retain(|(name, l)| !(name == event && Rc::ptr_eq(l, listener)));
    }

    fn destroy(&self) {
        self.journal.push(Call::Destroy(self.serial));
        self.destroyed.set(true);
    }
}

/// Constructor numbering widgets 1, 2, 3, ...
pub fn constructor(
    journal: &Journal,
) -> impl Fn(Option<&FakeNode>) -> anyhow::Result<FakeWidget> + 'static {
    let journal = journal.clone();
    let serial = Cell::new(0);
    move |node: Option<&FakeNode>| -> anyhow::Result<FakeWidget> {
        journal.push(Call::Construct(node.cloned()));
        serial.set(serial.get() + 1);
        Ok(FakeWidget {
            serial: serial.get(),
            node: node.cloned(),
            journal: journal.clone(),
            listeners: RefCell::new(Vec::new()),
            destroyed: Cell::new(false),
        })
    }
}

/// Constructor that refuses to bind without a node, like a real widget would.
pub fn strict_constructor(
    journal: &Journal,
) -> impl Fn(Option<&FakeNode>) -> anyhow::Result<FakeWidget> + 'static {
    let inner = constructor(journal);
    let journal = journal.clone();
    move |node: Option<&FakeNode>| -> anyhow::Result<FakeWidget> {
        if node.is_none() {
            journal.push(Call::Construct(None));
            anyhow::bail!("cannot bind widget to a missing root node");
        }
        inner(node)
    }
}

pub fn mount_recorder(journal: &Journal) -> impl Fn() -> anyhow::Result<()> + 'static {
    let journal = journal.clone();
    move || {
        journal.push(Call::Mount);
        Ok(())
    }
}

pub fn update_recorder(
    journal: &Journal,
) -> impl Fn(
    Option<&Props<FakeWidget>>,
    &Props<FakeWidget>,
    Option<&FakeWidget>,
) -> anyhow::Result<()>
       + 'static {
    let journal = journal.clone();
    move |previous: Option<&Props<FakeWidget>>,
          next: &Props<FakeWidget>,
          widget: Option<&FakeWidget>|
          -> anyhow::Result<()> {
        journal.push(Call::Update {
            previous: previous.map(|p| Value::Object(p.data())),
            next: Value::Object(next.data()),
            widget: widget.map(|w| w.serial),
        });
        Ok(())
    }
}

pub fn handler_recorder(
    journal: &Journal,
    event: &'static str,
) -> impl Fn(&FakeEvent, &Props<FakeWidget>, Option<&FakeWidget>) -> anyhow::Result<()> + 'static
{
    let journal = journal.clone();
    move |payload: &FakeEvent,
          props: &Props<FakeWidget>,
          widget: Option<&FakeWidget>|
          -> anyhow::Result<()> {
        if payload.detail == Value::String("fail".to_string()) {
            anyhow::bail!("handler for '{}' failed", event);
        }
        journal.push(Call::Handled {
            event: event.to_string(),
            props: Value::Object(props.data()),
            widget: widget.map(|w| w.serial),
        });
        Ok(())
    }
}

/// Host resolver that always finds `node`.
pub fn host(node: Option<FakeNode>) -> impl Fn(ComponentId) -> Option<FakeNode> + 'static {
    move |_: ComponentId| node.clone()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
