use crate::error::Result;
use crate::node::Node;
use std::collections::HashMap;
use std::rc::Rc;

pub type Handler<S> = Rc<dyn Fn(&mut Visitor<S>, &Node) -> Result<()>>;

/// Walks a tree, dispatching each node to the handler registered for its
/// rule name. Names are matched case-insensitively. Nodes without a handler
/// are walked by [`Visitor::walk`].
pub struct Visitor<S> {
    pub state: S,
    handlers: HashMap<String, Handler<S>>,
}

impl<S> Visitor<S> {
    pub fn new(state: S) -> Self {
        Visitor {
            state,
            handlers: HashMap::new(),
        }
    }

    /// Register a handler, builder style.
    pub fn on(
        mut self,
        name: &str,
        handler: impl Fn(&mut Visitor<S>, &Node) -> Result<()> + 'static,
    ) -> Self {
        self.add(name, handler);
        self
    }

    pub fn add(&mut self, name: &str, handler: impl Fn(&mut Visitor<S>, &Node) -> Result<()> + 'static) {
        self.handlers.insert(name.to_lowercase(), Rc::new(handler));
    }

    pub fn visit(&mut self, node: &Node) -> Result<()> {
        match self.handlers.get(&node.name.to_lowercase()).cloned() {
            Some(handler) => handler(self, node),
            None => self.walk(node),
        }
    }

    /// Visit every child node, in property order then sequence order.
    pub fn walk(&mut self, node: &Node) -> Result<()> {
        for value in node.properties.values() {
            value.accept(self)?;
        }

        Ok(())
    }

    pub fn into_state(self) -> S {
        self.state
    }
}
