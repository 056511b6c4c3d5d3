//! The command tree.
//!
//! Modules register [`CommandEntry`]s into a root [`Namespace`]; the result
//! is frozen into a [`CommandRegistry`] snapshot that the dispatcher shares
//! behind an `Arc` until the next reload replaces it.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::signature::{Arguments, Signature};
use super::{CommandHandler, FnHandler, Responder};
use crate::access::AccessLevel;
use crate::error::DispatchError;

pub const DEFAULT_DOC: &str = "No help available for this command";

/// A command leaf: the handler plus what the dispatcher needs to gate and
/// bind it.
pub struct CommandEntry {
    name: String,
    handler: Arc<dyn CommandHandler>,
    access: AccessLevel,
    doc: String,
    signature: Signature,
}

impl CommandEntry {
    pub fn new(name: impl Into<String>, handler: impl CommandHandler + 'static) -> Self {
        Self {
            name: name.into(),
            handler: Arc::new(handler),
            access: AccessLevel::Standard,
            doc: DEFAULT_DOC.to_string(),
            signature: Signature::default(),
        }
    }

    pub fn from_fn<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Responder, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::new(name, FnHandler(f))
    }

    /// Minimum caller level.
    pub fn access(mut self, level: AccessLevel) -> Self {
        self.access = level;
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn args(mut self, signature: Signature) -> Self {
        self.signature = signature;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required_access(&self) -> AccessLevel {
        self.access
    }

    pub fn help(&self) -> &str {
        &self.doc
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn handler(&self) -> Arc<dyn CommandHandler> {
        Arc::clone(&self.handler)
    }
}

impl fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry")
            .field("name", &self.name)
            .field("access", &self.access)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// A node of the command tree, borrowed from its parent namespace.
#[derive(Debug, Clone, Copy)]
pub enum CommandNode<'a> {
    Handler(&'a Arc<CommandEntry>),
    Namespace(&'a Namespace),
}

/// Named commands and child namespaces plus an optional fallback handler.
///
/// A name is bound to a command or to a namespace, never both.
#[derive(Debug, Default)]
pub struct Namespace {
    commands: BTreeMap<String, Arc<CommandEntry>>,
    children: BTreeMap<String, Namespace>,
    default: Option<Arc<CommandEntry>>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command under its own name, replacing whatever held the name.
    /// Returns the command it replaced.
    pub fn insert(&mut self, entry: CommandEntry) -> Option<Arc<CommandEntry>> {
        let name = entry.name.clone();
        self.children.remove(&name);
        self.commands.insert(name, Arc::new(entry))
    }

    /// Child namespace `name`, created if missing.
    ///
    /// A command already registered under `name` becomes the new
    /// namespace's default.
    pub fn namespace(&mut self, name: &str) -> &mut Namespace {
        let previous = self.commands.remove(name);
        let ns = self.children.entry(name.to_string()).or_default();
        if let Some(entry) = previous {
            ns.default = Some(entry);
        }
        ns
    }

    /// Handler used when no child matches the next token.
    pub fn set_default(&mut self, entry: CommandEntry) {
        self.default = Some(Arc::new(entry));
    }

    pub fn get(&self, name: &str) -> Option<CommandNode<'_>> {
        self.commands
            .get(name)
            .map(CommandNode::Handler)
            .or_else(|| self.children.get(name).map(CommandNode::Namespace))
    }

    pub fn default_entry(&self) -> Option<&Arc<CommandEntry>> {
        self.default.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.children.is_empty() && self.default.is_none()
    }

    fn collect(&self, path: &mut Vec<String>, out: &mut Vec<(String, Arc<CommandEntry>)>) {
        if let Some(entry) = &self.default {
            out.push((path.join(" "), Arc::clone(entry)));
        }
        for (name, entry) in &self.commands {
            path.push(name.clone());
            out.push((path.join(" "), Arc::clone(entry)));
            path.pop();
        }
        for (name, ns) in &self.children {
            path.push(name.clone());
            ns.collect(path, out);
            path.pop();
        }
    }
}

/// A resolved invocation target.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub entry: Arc<CommandEntry>,
    /// Tokens consumed as the command path.
    pub path: Vec<String>,
    /// Tokens left for argument binding.
    pub args: Vec<String>,
}

/// Immutable snapshot of the command tree.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    root: Namespace,
}

impl CommandRegistry {
    pub fn new(root: Namespace) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Namespace {
        &self.root
    }

    /// Walk the tree consuming matching tokens.
    ///
    /// Stops at a handler leaf, at the first token with no matching child,
    /// or when the tokens run out. Stopping inside a namespace falls back
    /// to its default, which receives the unmatched tokens as arguments.
    pub fn resolve(&self, tokens: &[String]) -> Result<Resolution, DispatchError> {
        let mut ns = &self.root;
        let mut consumed = 0;

        while let Some(token) = tokens.get(consumed) {
            match ns.get(token) {
                Some(CommandNode::Handler(entry)) => {
                    consumed += 1;
                    return Ok(Resolution {
                        entry: Arc::clone(entry),
                        path: tokens[..consumed].to_vec(),
                        args: tokens[consumed..].to_vec(),
                    });
                }
                Some(CommandNode::Namespace(child)) => {
                    ns = child;
                    consumed += 1;
                }
                None => break,
            }
        }

        match &ns.default {
            Some(entry) => Ok(Resolution {
                entry: Arc::clone(entry),
                path: tokens[..consumed].to_vec(),
                args: tokens[consumed..].to_vec(),
            }),
            None => Err(DispatchError::Lookup(tokens.join(" "))),
        }
    }

    /// Node at exactly `path`, no default fallback.
    pub fn lookup_exact(&self, path: &[String]) -> Option<CommandNode<'_>> {
        let (last, parents) = path.split_last()?;
        let mut ns = &self.root;
        for name in parents {
            match ns.get(name)? {
                CommandNode::Namespace(child) => ns = child,
                CommandNode::Handler(_) => return None,
            }
        }
        ns.get(last)
    }

    /// Every invocable command as `(path, entry)`, sorted by path.
    ///
    /// A namespace default is listed under the namespace's own path.
    pub fn flatten(&self) -> Vec<(String, Arc<CommandEntry>)> {
        let mut out = Vec::new();
        self.root.collect(&mut Vec::new(), &mut out);
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    pub fn len(&self) -> usize {
        self.flatten().len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}
