//! Model definitions for the assistant
//!
//! All model definitions live here so adding a model is a one-entry change.

use super::gemini::{GeminiModel, GeminiService};
use super::LlmService;
use std::sync::Arc;

/// Model definition with metadata
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// Model ID, also the provider's API name (e.g., "gemini-3-flash-preview")
    pub id: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function to create the service
    pub factory: fn(&str, Option<&str>) -> Result<Arc<dyn LlmService>, String>,
}

/// Get all available model definitions
pub fn all_models() -> &'static [ModelDef] {
    &[
        ModelDef {
            id: "gemini-3-flash-preview",
            description: "Gemini 3 Flash (fast, default for the assistant panel)",
            factory: |api_key, gateway| build_gemini(api_key, GeminiModel::Gemini3Flash, gateway),
        },
        ModelDef {
            id: "gemini-3-pro-preview",
            description: "Gemini 3 Pro (most capable, slower)",
            factory: |api_key, gateway| build_gemini(api_key, GeminiModel::Gemini3Pro, gateway),
        },
    ]
}

fn build_gemini(
    api_key: &str,
    model: GeminiModel,
    gateway: Option<&str>,
) -> Result<Arc<dyn LlmService>, String> {
    // Accept any non-empty key (including "implicit" for gateway mode)
    if api_key.is_empty() {
        return Err(format!(
            "{} requires GEMINI_API_KEY or gateway",
            model.api_name()
        ));
    }
    let service = GeminiService::new(api_key.to_string(), model, gateway).map_err(|e| e.message)?;
    Ok(Arc::new(service))
}
