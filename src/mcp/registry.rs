//! Capability registry for the MCP server.
//!
//! The registry is the single source of truth mapping a (kind, key) pair
//! to a capability's metadata and handler. It is populated once during
//! startup and never mutated afterwards; the server only reads from it.
//!
//! # Lookup Semantics
//!
//! - `register` rejects a duplicate (kind, key) pair — startup must fail
//!   rather than silently overwrite a capability.
//! - `list` returns descriptors in registration order.
//! - `resolve` is an exact string match; there is no prefix or fuzzy
//!   matching.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::{HandlerError, NotFoundError, RegistryError};

/// The kind of a registered capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    /// A retrievable message template.
    Prompt,
    /// A named, addressable read-only content blob.
    Resource,
    /// An invokable operation accepting structured arguments.
    Tool,
}

impl CapabilityKind {
    /// Returns the capitalised label used in error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Prompt => "Prompt",
            Self::Resource => "Resource",
            Self::Tool => "Tool",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Metadata describing a registered capability.
///
/// The key is the prompt/tool name, or the resource uri.
#[derive(Debug, Clone)]
pub struct CapabilityDescriptor {
    /// The capability kind.
    pub kind: CapabilityKind,
    /// Unique key within the kind.
    pub key: String,
    /// Optional human-readable title.
    pub title: Option<String>,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for tool input parameters.
    pub input_schema: Option<Value>,
    /// MIME type of resource contents.
    pub mime_type: Option<String>,
}

impl CapabilityDescriptor {
    /// Creates a descriptor with the required fields; optional fields
    /// start empty.
    #[must_use]
    pub fn new(kind: CapabilityKind, key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
            title: None,
            description: description.into(),
            input_schema: None,
            mime_type: None,
        }
    }

    /// Sets the human-readable title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the tool input schema.
    #[must_use]
    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }

    /// Sets the resource MIME type.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// The role of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A message attributed to the user.
    User,
    /// A message attributed to the assistant.
    Assistant,
}

/// A single message in a prompt payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    /// The message role.
    pub role: Role,
    /// The message text.
    pub text: String,
}

impl PromptMessage {
    /// Creates a user-role message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }
}

/// The contents of a resource payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    /// The resource uri.
    pub uri: String,
    /// The MIME type of the text.
    pub mime_type: String,
    /// The resource text.
    pub text: String,
}

/// Content item in a tool call result.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Structured side-channel data for downstream consumers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    /// Whether the tool call resulted in an error.
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires a predicate fn(&T) -> bool, so we must take &bool here
pub(crate) const fn is_false(b: &bool) -> bool {
    !*b
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            structured_content: None,
            is_error: false,
        }
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            structured_content: None,
            is_error: true,
        }
    }

    /// Attaches structured side-channel data.
    #[must_use]
    pub fn with_structured(mut self, value: Value) -> Self {
        self.structured_content = Some(value);
        self
    }
}

/// The kind-specific payload produced by a successful handler invocation.
#[derive(Debug, Clone)]
pub enum CapabilityOutput {
    /// Ordered prompt messages.
    Prompt(Vec<PromptMessage>),
    /// Resource contents.
    Resource(ResourceContents),
    /// Tool call result.
    Tool(ToolCallResult),
}

/// The future returned by a capability handler.
pub type HandlerFuture =
    Pin<Box<dyn Future<Output = Result<CapabilityOutput, HandlerError>> + Send>>;

/// A capability handler function.
///
/// Takes the request arguments (`Value::Null` for prompts and resources,
/// the `arguments` object for tools) and produces the capability's
/// payload asynchronously.
pub type Handler = Box<dyn Fn(Value) -> HandlerFuture + Send + Sync>;

/// A registered capability: descriptor plus handler.
pub struct Capability {
    descriptor: CapabilityDescriptor,
    handler: Handler,
}

impl Capability {
    /// Returns the capability's descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    /// Invokes the capability's handler with the given arguments.
    pub fn invoke(&self, arguments: Value) -> HandlerFuture {
        (self.handler)(arguments)
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// The capability registry.
///
/// Three independent ordered tables, one per kind. Built once at startup
/// and read-only afterwards.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    prompts: IndexMap<String, Capability>,
    resources: IndexMap<String, Capability>,
    tools: IndexMap<String, Capability>,
}

impl CapabilityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    const fn table(&self, kind: CapabilityKind) -> &IndexMap<String, Capability> {
        match kind {
            CapabilityKind::Prompt => &self.prompts,
            CapabilityKind::Resource => &self.resources,
            CapabilityKind::Tool => &self.tools,
        }
    }

    fn table_mut(&mut self, kind: CapabilityKind) -> &mut IndexMap<String, Capability> {
        match kind {
            CapabilityKind::Prompt => &mut self.prompts,
            CapabilityKind::Resource => &mut self.resources,
            CapabilityKind::Tool => &mut self.tools,
        }
    }

    /// Registers a capability under its descriptor's (kind, key).
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or already registered for
    /// that kind. Registration failures are fatal at startup.
    pub fn register(
        &mut self,
        descriptor: CapabilityDescriptor,
        handler: Handler,
    ) -> Result<(), RegistryError> {
        let kind = descriptor.kind;
        if descriptor.key.is_empty() {
            return Err(RegistryError::EmptyKey { kind });
        }

        let key = descriptor.key.clone();
        let table = self.table_mut(kind);
        if table.contains_key(&key) {
            return Err(RegistryError::DuplicateKey { kind, key });
        }

        table.insert(
            key,
            Capability {
                descriptor,
                handler,
            },
        );
        Ok(())
    }

    /// Returns the descriptors registered for a kind, in registration
    /// order.
    pub fn list(&self, kind: CapabilityKind) -> impl Iterator<Item = &CapabilityDescriptor> {
        self.table(kind).values().map(Capability::descriptor)
    }

    /// Resolves a capability by exact key.
    ///
    /// # Errors
    ///
    /// Returns a [`NotFoundError`] if no entry matches.
    pub fn resolve(&self, kind: CapabilityKind, key: &str) -> Result<&Capability, NotFoundError> {
        self.table(kind).get(key).ok_or_else(|| NotFoundError {
            kind,
            key: key.to_string(),
        })
    }

    /// Returns the number of capabilities registered for a kind.
    #[must_use]
    pub fn len(&self, kind: CapabilityKind) -> usize {
        self.table(kind).len()
    }

    /// Returns `true` if no capability of the given kind is registered.
    #[must_use]
    pub fn is_empty(&self, kind: CapabilityKind) -> bool {
        self.table(kind).is_empty()
    }
}
