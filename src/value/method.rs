//! Callables and method chains
//!
//! A [`Method`] is either an endpoint (a plain function of the instance and
//! its arguments) or a link: a plumbing function that additionally receives a
//! [`Next`] handle for the rest of the chain. Links form an explicit linked
//! structure, each node owning the node after it. An unattached link has no
//! next node yet; attaching a chain to its endpoint rebuilds the nodes along
//! the way and leaves the original chain untouched.

use std::fmt;
use std::sync::Arc;

use super::doc::DocMerger;
use super::Value;
use crate::host::{CallError, Instance};

pub type CallResult = Result<Value, CallError>;

/// Plain function body: `(instance, args) -> value`
pub type EndpointFn = dyn Fn(&mut Instance, &[Value]) -> CallResult + Send + Sync;

/// Plumbing function body: `(next, instance, args) -> value`
pub type LinkFn = dyn Fn(Next<'_>, &mut Instance, &[Value]) -> CallResult + Send + Sync;

#[derive(Clone)]
enum Body {
    Endpoint(Arc<EndpointFn>),
    Link {
        func: Arc<LinkFn>,
        next: Option<Method>,
    },
}

struct Node {
    name: Option<String>,
    doc: Option<String>,
    body: Body,
}

/// A callable attribute value
///
/// Cloning is cheap and preserves identity: two methods are equal only when
/// they share the same node.
#[derive(Clone)]
pub struct Method {
    node: Arc<Node>,
}

impl Method {
    fn from_node(node: Node) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    /// Create an endpoint method
    pub fn endpoint<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut Instance, &[Value]) -> CallResult + Send + Sync + 'static,
    {
        Self::from_node(Node {
            name: Some(name.into()),
            doc: None,
            body: Body::Endpoint(Arc::new(func)),
        })
    }

    /// Create an unattached plumbing link
    pub fn link<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Next<'_>, &mut Instance, &[Value]) -> CallResult + Send + Sync + 'static,
    {
        Self::from_node(Node {
            name: Some(name.into()),
            doc: None,
            body: Body::Link {
                func: Arc::new(func),
                next: None,
            },
        })
    }

    /// Same body with a docstring (a new identity)
    pub fn with_doc(self, doc: impl Into<String>) -> Self {
        Self::from_node(Node {
            name: self.node.name.clone(),
            doc: Some(doc.into()),
            body: self.node.body.clone(),
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.node.name.as_deref()
    }

    pub fn doc(&self) -> Option<&str> {
        self.node.doc.as_deref()
    }

    pub fn is_endpoint(&self) -> bool {
        matches!(self.node.body, Body::Endpoint(_))
    }

    pub fn is_link(&self) -> bool {
        !self.is_endpoint()
    }

    /// Whether invoking this method reaches an endpoint
    pub fn is_terminated(&self) -> bool {
        match &self.node.body {
            Body::Endpoint(_) => true,
            Body::Link { next: Some(n), .. } => n.is_terminated(),
            Body::Link { next: None, .. } => false,
        }
    }

    /// Number of nodes in this chain, endpoint included
    pub fn depth(&self) -> usize {
        match &self.node.body {
            Body::Endpoint(_) => 1,
            Body::Link { next: Some(n), .. } => 1 + n.depth(),
            Body::Link { next: None, .. } => 1,
        }
    }

    /// Attach `next` behind the last unattached link of this chain
    ///
    /// Endpoints and terminated chains are returned as-is: nothing behind
    /// them is reachable. Docstrings are stitched at every rebuilt node.
    pub fn then(&self, next: &Method, docs: &DocMerger) -> Method {
        match &self.node.body {
            Body::Endpoint(_) => self.clone(),
            Body::Link { func, next: tail } => {
                let attached = match tail {
                    None => next.clone(),
                    Some(inner) if inner.is_terminated() => return self.clone(),
                    Some(inner) => inner.then(next, docs),
                };
                Method::from_node(Node {
                    name: self.node.name.clone(),
                    doc: docs.merge(self.doc(), next.doc()),
                    body: Body::Link {
                        func: Arc::clone(func),
                        next: Some(attached),
                    },
                })
            }
        }
    }

    /// Single dispatch entry point for endpoints and chains
    pub fn invoke(&self, this: &mut Instance, args: &[Value]) -> CallResult {
        match &self.node.body {
            Body::Endpoint(func) => func(this, args),
            Body::Link { func, next } => {
                let handle = Next {
                    name: self.name(),
                    method: next.as_ref(),
                };
                func(handle, this, args)
            }
        }
    }
}

impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_endpoint() { "method" } else { "link" };
        write!(f, "<{} {}>", kind, self.name().unwrap_or("anonymous"))
    }
}

/// Handle to the rest of a chain, passed to every link
///
/// A link may call it any number of times, including not at all.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    name: Option<&'a str>,
    method: Option<&'a Method>,
}

impl<'a> Next<'a> {
    /// Whether anything follows the current link
    pub fn exists(&self) -> bool {
        self.method.is_some()
    }

    pub fn method(&self) -> Option<&'a Method> {
        self.method
    }

    /// Invoke the rest of the chain
    pub fn call(&self, this: &mut Instance, args: &[Value]) -> CallResult {
        match self.method {
            Some(method) => method.invoke(this, args),
            None => Err(CallError::NoNext {
                name: self.name.unwrap_or("anonymous").to_string(),
            }),
        }
    }
}
