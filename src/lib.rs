//! figma-to-code-mcp: MCP server for AI-assisted Figma-to-React conversion
//!
//! This library exposes a Figma design snapshot, conversion instructions
//! and the Glide Design Library documentation as MCP capabilities that AI
//! assistants can consume when generating React code.
//!
//! # Architecture
//!
//! The server serves static content; the AI handles the intelligence:
//!
//! - **Prompt** `best-practices-instructions`: conversion guidance as a
//!   single user message
//! - **Resource** `glide-design-library-docs`: component documentation in
//!   Markdown
//! - **Tool** `fetch-figma-design`: returns the design document JSON plus
//!   pointers to the prompt and resource
//!
//! The AI (not this server) handles:
//! - Interpreting the design document
//! - Generating React code against the Glide Design Library
//!
//! # Modules
//!
//! - [`catalog`] — Capability definitions and registry construction
//! - [`config`] — Configuration loading and validation
//! - [`content`] — Backing content file access
//! - [`error`] — Error types
//! - [`mcp`] — MCP protocol implementation

pub mod catalog;
pub mod config;
pub mod content;
pub mod error;
pub mod mcp;
