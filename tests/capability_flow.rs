//! Integration tests for the capability registry and handlers.
//!
//! These tests exercise the full catalogue over real backing files in a
//! temporary directory: listing and resolution, pass-through prompt and
//! resource loads, and the design-fetch tool's success and failure paths.

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use figma_to_code_mcp::catalog::{
    build_registry, BEST_PRACTICES_PROMPT, DESIGN_DOCS_RESOURCE, FETCH_FIGMA_DESIGN_TOOL,
};
use figma_to_code_mcp::content::ContentStore;
use figma_to_code_mcp::mcp::registry::{
    CapabilityKind, CapabilityOutput, CapabilityRegistry, Role,
};

const INSTRUCTIONS: &str = "# Conversion instructions\n\nPrefer Glide components over raw HTML.\n";
const DOCUMENTATION: &str = "# Glide Design Library\n\n## Button\n\nUse `<GlideButton>`.\n";
const DESIGN_SNAPSHOT: &str = r#"{
    "name": "Landing Page",
    "lastModified": "2025-11-03T10:15:00Z",
    "document": {
        "id": "0:0",
        "type": "DOCUMENT",
        "children": [
            { "id": "0:1", "type": "CANVAS", "name": "Page 1", "children": [] }
        ]
    }
}"#;

fn store_in(dir: &Path) -> Arc<ContentStore> {
    Arc::new(ContentStore::new(
        dir.join("instructions.md"),
        dir.join("glide-documentation.md"),
        dir.join("design.json"),
    ))
}

fn fixture() -> (TempDir, CapabilityRegistry) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("instructions.md"), INSTRUCTIONS).unwrap();
    std::fs::write(dir.path().join("glide-documentation.md"), DOCUMENTATION).unwrap();
    std::fs::write(dir.path().join("design.json"), DESIGN_SNAPSHOT).unwrap();

    let registry = build_registry(&store_in(dir.path())).unwrap();
    (dir, registry)
}

// =============================================================================
// Registry Properties
// =============================================================================

#[test]
fn every_listed_capability_resolves() {
    let (_dir, registry) = fixture();

    for kind in [
        CapabilityKind::Prompt,
        CapabilityKind::Resource,
        CapabilityKind::Tool,
    ] {
        let keys: Vec<String> = registry.list(kind).map(|d| d.key.clone()).collect();
        assert_eq!(keys.len(), 1, "expected exactly one {kind}");

        for key in &keys {
            let capability = registry.resolve(kind, key).unwrap();
            assert_eq!(&capability.descriptor().key, key);
        }
    }
}

#[test]
fn unregistered_keys_fail_for_every_kind() {
    let (_dir, registry) = fixture();

    for kind in [
        CapabilityKind::Prompt,
        CapabilityKind::Resource,
        CapabilityKind::Tool,
    ] {
        let err = registry.resolve(kind, "does-not-exist").unwrap_err();
        assert_eq!(err.kind, kind);
        assert_eq!(err.key, "does-not-exist");
    }
}

// =============================================================================
// Prompt & Resource Pass-Through
// =============================================================================

#[tokio::test]
async fn prompt_returns_instructions_verbatim() {
    let (_dir, registry) = fixture();

    let capability = registry
        .resolve(CapabilityKind::Prompt, BEST_PRACTICES_PROMPT)
        .unwrap();
    let output = capability.invoke(Value::Null).await.unwrap();

    let CapabilityOutput::Prompt(messages) = output else {
        panic!("Expected prompt payload");
    };
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].text, INSTRUCTIONS);
}

#[tokio::test]
async fn resource_returns_documentation_verbatim() {
    let (_dir, registry) = fixture();

    let capability = registry
        .resolve(CapabilityKind::Resource, DESIGN_DOCS_RESOURCE)
        .unwrap();
    let output = capability.invoke(Value::Null).await.unwrap();

    let CapabilityOutput::Resource(contents) = output else {
        panic!("Expected resource payload");
    };
    assert_eq!(contents.uri, DESIGN_DOCS_RESOURCE);
    assert_eq!(contents.mime_type, "text/markdown");
    assert_eq!(contents.text, DOCUMENTATION);
}

// =============================================================================
// fetch-figma-design Tool
// =============================================================================

#[tokio::test]
async fn tool_round_trips_the_snapshot() {
    let (_dir, registry) = fixture();

    let capability = registry
        .resolve(CapabilityKind::Tool, FETCH_FIGMA_DESIGN_TOOL)
        .unwrap();
    let output = capability
        .invoke(json!({
            "figmaUrl": "https://www.figma.com/design/abc/Landing?node-id=1-2"
        }))
        .await
        .unwrap();

    let CapabilityOutput::Tool(result) = output else {
        panic!("Expected tool payload");
    };
    assert!(!result.is_error);

    let structured = result.structured_content.unwrap();
    let expected: Value = serde_json::from_str(DESIGN_SNAPSHOT).unwrap();
    assert_eq!(structured["figmaDesignJson"], expected);
    assert_eq!(structured["bestPracticesPromptId"], BEST_PRACTICES_PROMPT);
    assert_eq!(structured["designDocsResourceId"], DESIGN_DOCS_RESOURCE);
}

#[tokio::test]
async fn tool_summary_names_prompt_and_resource() {
    let (_dir, registry) = fixture();

    let capability = registry
        .resolve(CapabilityKind::Tool, FETCH_FIGMA_DESIGN_TOOL)
        .unwrap();
    let output = capability
        .invoke(json!({"figmaUrl": "https://www.figma.com/design/abc/Landing"}))
        .await
        .unwrap();

    let CapabilityOutput::Tool(result) = output else {
        panic!("Expected tool payload");
    };
    let text = serde_json::to_value(&result.content).unwrap()[0]["text"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(text.contains(BEST_PRACTICES_PROMPT));
    assert!(text.contains(DESIGN_DOCS_RESOURCE));
}

#[tokio::test]
async fn tool_reports_missing_snapshot_without_crashing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("instructions.md"), INSTRUCTIONS).unwrap();
    std::fs::write(dir.path().join("glide-documentation.md"), DOCUMENTATION).unwrap();
    // design.json deliberately absent
    let registry = build_registry(&store_in(dir.path())).unwrap();

    let capability = registry
        .resolve(CapabilityKind::Tool, FETCH_FIGMA_DESIGN_TOOL)
        .unwrap();
    let err = capability
        .invoke(json!({"figmaUrl": "https://www.figma.com/design/abc/Landing"}))
        .await
        .unwrap_err();

    assert!(err.message.contains("design.json"));
    assert!(err.message.contains("failed to read"));

    // The registry keeps serving after the failure
    let prompt = registry
        .resolve(CapabilityKind::Prompt, BEST_PRACTICES_PROMPT)
        .unwrap();
    assert!(prompt.invoke(Value::Null).await.is_ok());
}

#[tokio::test]
async fn tool_reports_malformed_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("design.json"), "{broken").unwrap();
    let registry = build_registry(&store_in(dir.path())).unwrap();

    let capability = registry
        .resolve(CapabilityKind::Tool, FETCH_FIGMA_DESIGN_TOOL)
        .unwrap();
    let err = capability
        .invoke(json!({"figmaUrl": "https://www.figma.com/design/abc/Landing"}))
        .await
        .unwrap_err();

    assert!(err.message.contains("failed to parse"));
    assert!(err.message.contains("design.json"));
}
