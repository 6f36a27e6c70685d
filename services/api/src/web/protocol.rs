//! services/api/src/web/protocol.rs
//!
//! Request payloads and query parameters of the REST API.

use serde::{Deserialize, Serialize};
use skinlog_core::domain::{IngredientCategory, SkinGoal};
use utoipa::{IntoParams, ToSchema};

/// A product typed in by hand instead of photographed.
#[derive(Deserialize, ToSchema, Debug, Default)]
pub struct ManualProductRequest {
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub name: String,
}

/// The knobs of tonight's routine. Anything omitted falls back to the defaults.
#[derive(Deserialize, IntoParams, Debug, Default, Clone, Copy)]
#[into_params(parameter_in = Query)]
pub struct RoutineParams {
    /// "Clear Pores", "Anti-Aging", "Texture/Glow" or "Barrier Repair". Defaults to Clear Pores.
    #[param(value_type = Option<String>)]
    pub goal: Option<SkinGoal>,
    /// Whether the facial device is available tonight. Defaults to true.
    pub device: Option<bool>,
    /// Relative humidity in percent, clamped to 0..=100 and rounded.
    /// Defaults to the configured ambient humidity.
    pub humidity: Option<f64>,
}

impl RoutineParams {
    pub fn goal(&self) -> SkinGoal {
        self.goal.unwrap_or_default()
    }

    pub fn device_enabled(&self) -> bool {
        self.device.unwrap_or(true)
    }

    pub fn humidity_or(&self, ambient: u8) -> u8 {
        match self.humidity {
            Some(h) if h.is_finite() => h.clamp(0.0, 100.0).round() as u8,
            _ => ambient,
        }
    }
}

/// Usage guidance for one ingredient category.
#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGuide {
    /// The category label, as stored on products.
    pub category: String,
    pub description: String,
    pub ingredient_hints: Vec<String>,
}

impl From<IngredientCategory> for CategoryGuide {
    fn from(category: IngredientCategory) -> Self {
        Self {
            category: category.label().to_string(),
            description: category.description().to_string(),
            ingredient_hints: category
                .ingredient_hints()
                .iter()
                .map(|hint| hint.to_string())
                .collect(),
        }
    }
}
