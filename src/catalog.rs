//! The server's capability catalogue.
//!
//! Builds the [`CapabilityRegistry`] with the three capabilities this
//! server exposes:
//!
//! - the `best-practices-instructions` prompt,
//! - the `glide-design-library-docs` resource,
//! - the `fetch-figma-design` tool.
//!
//! Handlers close over a shared [`ContentStore`] and load their backing
//! file on every invocation.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::content::ContentStore;
use crate::error::{HandlerError, RegistryError};
use crate::mcp::registry::{
    CapabilityDescriptor, CapabilityKind, CapabilityOutput, CapabilityRegistry, PromptMessage,
    ResourceContents, ToolCallResult,
};

/// Name of the best-practices prompt.
pub const BEST_PRACTICES_PROMPT: &str = "best-practices-instructions";

/// Uri of the design-library documentation resource.
pub const DESIGN_DOCS_RESOURCE: &str = "glide-design-library-docs";

/// Name of the design-fetch tool.
pub const FETCH_FIGMA_DESIGN_TOOL: &str = "fetch-figma-design";

/// Builds the capability registry over the given content store.
///
/// # Errors
///
/// Returns an error if a capability key collides; this is fatal at
/// startup.
pub fn build_registry(store: &Arc<ContentStore>) -> Result<CapabilityRegistry, RegistryError> {
    let mut registry = CapabilityRegistry::new();

    register_best_practices_prompt(&mut registry, store)?;
    register_design_docs_resource(&mut registry, store)?;
    register_fetch_figma_design_tool(&mut registry, store)?;

    Ok(registry)
}

fn register_best_practices_prompt(
    registry: &mut CapabilityRegistry,
    store: &Arc<ContentStore>,
) -> Result<(), RegistryError> {
    let descriptor = CapabilityDescriptor::new(
        CapabilityKind::Prompt,
        BEST_PRACTICES_PROMPT,
        "Best practices prompt for converting Figma JSON to React code using \
         Glide Design Library",
    );

    let store = Arc::clone(store);
    registry.register(
        descriptor,
        Box::new(move |_arguments| {
            let store = Arc::clone(&store);
            Box::pin(async move {
                let text = store.instructions().await.map_err(HandlerError::from)?;
                Ok(CapabilityOutput::Prompt(vec![PromptMessage::user(text)]))
            })
        }),
    )
}

fn register_design_docs_resource(
    registry: &mut CapabilityRegistry,
    store: &Arc<ContentStore>,
) -> Result<(), RegistryError> {
    let descriptor = CapabilityDescriptor::new(
        CapabilityKind::Resource,
        DESIGN_DOCS_RESOURCE,
        "Glide Design Library documentation in Markdown format",
    )
    .with_mime_type("text/markdown");

    let store = Arc::clone(store);
    registry.register(
        descriptor,
        Box::new(move |_arguments| {
            let store = Arc::clone(&store);
            Box::pin(async move {
                let text = store.documentation().await.map_err(HandlerError::from)?;
                Ok(CapabilityOutput::Resource(ResourceContents {
                    uri: DESIGN_DOCS_RESOURCE.to_string(),
                    mime_type: "text/markdown".to_string(),
                    text,
                }))
            })
        }),
    )
}

fn register_fetch_figma_design_tool(
    registry: &mut CapabilityRegistry,
    store: &Arc<ContentStore>,
) -> Result<(), RegistryError> {
    let descriptor = CapabilityDescriptor::new(
        CapabilityKind::Tool,
        FETCH_FIGMA_DESIGN_TOOL,
        "Fetches a specific component or frame from Figma using the Figma API, \
         reads conversion instructions and Glide design library documentation, \
         then generates React code based on the design specifications. Provide \
         the Figma file URL and the node ID of the component you want to convert.",
    )
    .with_title("Fetch Figma Design and Convert to React Code")
    .with_input_schema(json!({
        "type": "object",
        "properties": {
            "figmaUrl": {
                "type": "string",
                "format": "uri",
                "description": "URL of the Figma file or node to fetch"
            }
        },
        "required": ["figmaUrl"]
    }));

    let store = Arc::clone(store);
    registry.register(
        descriptor,
        Box::new(move |arguments| {
            let store = Arc::clone(&store);
            Box::pin(async move { fetch_figma_design(&store, &arguments).await })
        }),
    )
}

/// The `fetch-figma-design` handler.
///
/// The url is accepted and logged but not fetched; this version serves a
/// local snapshot of the design document instead of talking to the Figma
/// API.
async fn fetch_figma_design(
    store: &ContentStore,
    arguments: &Value,
) -> Result<CapabilityOutput, HandlerError> {
    let Some(figma_url) = arguments.get("figmaUrl").and_then(Value::as_str) else {
        return Err(HandlerError::new("Missing required parameter: figmaUrl"));
    };

    tracing::info!(figma_url, "Fetching design snapshot");

    let design = store.design_snapshot().await.map_err(HandlerError::from)?;

    let summary = format!(
        "Figma JSON fetched; consult the '{BEST_PRACTICES_PROMPT}' prompt and \
         the '{DESIGN_DOCS_RESOURCE}' resource before generating code."
    );

    Ok(CapabilityOutput::Tool(
        ToolCallResult::text(summary).with_structured(json!({
            "figmaDesignJson": design,
            "bestPracticesPromptId": BEST_PRACTICES_PROMPT,
            "designDocsResourceId": DESIGN_DOCS_RESOURCE,
        })),
    ))
}
