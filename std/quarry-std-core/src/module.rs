//!
//! Module Dispatch
//!
//! A module exposes a flat table of functions addressed by name. Each call
//! receives the module's per-session state explicitly; `ModuleContext`
//! creates that state on the first call and drops it on teardown, so a
//! session's resources live exactly as long as the context that owns them.
//!
//! Record streams may borrow the state, which keeps the state locked for the
//! lifetime of the stream: no other call can run until the stream is dropped.
//!

use crate::error::ModuleError;
use crate::value::{Item, Record};

/// Lazy sequence of records produced by a module call
pub type RecordStream<'a> = Box<dyn Iterator<Item = Result<Record, ModuleError>> + 'a>;

pub enum CallResult<'a> {
    Empty,
    Item(Item),
    Records(RecordStream<'a>),
}

impl<'a> CallResult<'a> {
    /// Drain the result into plain items; records become `Item::Object`.
    pub fn into_items(self) -> Result<Vec<Item>, ModuleError> {
        match self {
            CallResult::Empty => Ok(Vec::new()),
            CallResult::Item(item) => Ok(vec![item]),
            CallResult::Records(stream) => stream.map(|r| r.map(Item::Object)).collect(),
        }
    }

    /// The single item of the result, if there is exactly one non-stream item
    pub fn into_item(self) -> Option<Item> {
        match self {
            CallResult::Item(item) => Some(item),
            _ => None,
        }
    }
}

impl std::fmt::Debug for CallResult<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallResult::Empty => f.write_str("Empty"),
            CallResult::Item(item) => f.debug_tuple("Item").field(item).finish(),
            CallResult::Records(_) => f.write_str("Records(..)"),
        }
    }
}

pub trait ExternalModule {
    /// Per-session state owned by the caller's context
    type State;

    fn uri(&self) -> &'static str;

    /// Names accepted by `call`
    fn functions(&self) -> &'static [&'static str];

    fn new_state(&self) -> Self::State;

    fn call<'s>(
        &self,
        state: &'s mut Self::State,
        name: &str,
        args: &[Item],
    ) -> Result<CallResult<'s>, ModuleError>;
}

/// A module paired with its lazily created session state
pub struct ModuleContext<M: ExternalModule> {
    module: M,
    state: Option<M::State>,
}

impl<M: ExternalModule> ModuleContext<M> {
    pub fn new(module: M) -> Self {
        Self { module, state: None }
    }

    pub fn has_state(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&mut self) -> &mut M::State {
        let module = &self.module;
        self.state.get_or_insert_with(|| module.new_state())
    }

    pub fn call(&mut self, name: &str, args: &[Item]) -> Result<CallResult<'_>, ModuleError> {
        let module = &self.module;
        let state = self.state.get_or_insert_with(|| module.new_state());
        module.call(state, name, args)
    }

    /// Drop the session state, releasing everything it owns
    pub fn teardown(&mut self) {
        self.state = None;
    }
}
