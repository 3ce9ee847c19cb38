//! Gemini backend for slide generation.
//!
//! Implements [`slidegen_core::CompletionClient`] on top of the Gemini
//! `generateContent` REST endpoint with a JSON response schema.

pub mod client;
pub mod config;

pub use client::GeminiClient;
pub use config::{GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
