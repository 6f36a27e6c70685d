//! crates/skinlog_core/src/domain.rs
//!
//! Defines the core data structures for the application: the shelf, the usage log
//! and the derived routine. The serde representation matches the JSON blobs the
//! storage layer persists (camelCase fields, enum values as display labels).

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//=========================================================================================
// Closed Enumerations
//=========================================================================================

/// The category a product belongs to. Drives every routine rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IngredientCategory {
    #[serde(rename = "Retinoid")]
    Retinoid,
    #[serde(rename = "Direct Acid / Exfoliant")]
    AcidExfoliant,
    #[serde(rename = "Clay / Detox Mask")]
    ClayMask,
    #[serde(rename = "Soothing / Barrier")]
    SoothingBarrier,
    #[serde(rename = "Cleanser")]
    Cleanser,
    #[serde(rename = "Moisturizer")]
    Moisturizer,
    #[serde(rename = "Water-based Serum")]
    SerumWater,
    #[serde(rename = "Other", other)]
    Unknown,
}

impl IngredientCategory {
    pub const ALL: [IngredientCategory; 8] = [
        Self::Retinoid,
        Self::AcidExfoliant,
        Self::ClayMask,
        Self::SoothingBarrier,
        Self::Cleanser,
        Self::Moisturizer,
        Self::SerumWater,
        Self::Unknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Retinoid => "Retinoid",
            Self::AcidExfoliant => "Direct Acid / Exfoliant",
            Self::ClayMask => "Clay / Detox Mask",
            Self::SoothingBarrier => "Soothing / Barrier",
            Self::Cleanser => "Cleanser",
            Self::Moisturizer => "Moisturizer",
            Self::SerumWater => "Water-based Serum",
            Self::Unknown => "Other",
        }
    }

    /// Parses a category label coming from the classifier.
    ///
    /// Accepts the display label or the variant name, ignoring case and surrounding
    /// whitespace. Anything unrecognised becomes `Unknown`.
    pub fn from_label(raw: &str) -> Self {
        let wanted = raw.trim();
        Self::ALL
            .into_iter()
            .find(|c| {
                c.label().eq_ignore_ascii_case(wanted)
                    || format!("{:?}", c).eq_ignore_ascii_case(wanted)
            })
            .unwrap_or(Self::Unknown)
    }

    /// Short usage guidance shown next to a category.
    pub fn description(self) -> &'static str {
        match self {
            Self::Retinoid => "PM only. High absorption risk. Great for anti-aging.",
            Self::AcidExfoliant => "Direct Acids. Limit 2x/week. Conflict with Retinol.",
            Self::ClayMask => "Deep cleaning. Best for high humidity (>70%).",
            Self::SoothingBarrier => "Calming actives like Cica or Ceramides.",
            Self::Cleanser => "First step to clear impurities.",
            Self::Moisturizer => "Locks in hydration and actives.",
            Self::SerumWater => "Hydrating or active-rich lightweight formulas.",
            Self::Unknown => "General skincare product.",
        }
    }

    /// Typical ingredients or formats that place a product in this category.
    pub fn ingredient_hints(self) -> &'static [&'static str] {
        match self {
            Self::Retinoid => &[
                "Retinol",
                "Retinal",
                "Tretinoin",
                "Adapalene",
                "Granactive Retinoid",
            ],
            Self::AcidExfoliant => &[
                "Glycolic Acid (AHA)",
                "Salicylic Acid (BHA)",
                "Lactic Acid",
                "Mandelic Acid",
                "PHA",
            ],
            Self::ClayMask => &["Kaolin", "Bentonite", "Charcoal", "Amazonian White Clay"],
            Self::SoothingBarrier => &[
                "Centella Asiatica (Cica)",
                "Ceramides",
                "Panthenol (B5)",
                "Madecassoside",
                "Niacinamide",
            ],
            Self::Cleanser => &["Gel Cleanser", "Oil Cleanser", "Micellar Water", "Foaming Wash"],
            Self::Moisturizer => &["Hyaluronic Acid", "Squalane", "Glycerin", "Shea Butter"],
            Self::SerumWater => &["Vitamin C", "Peptides", "Snail Mucin", "Amino Acids"],
            Self::Unknown => &["Fragrance", "Extracts", "Vitamins"],
        }
    }

    /// Acid exfoliants and clay masks both count as "exfoliating" for recovery purposes.
    pub fn is_exfoliant(self) -> bool {
        matches!(self, Self::AcidExfoliant | Self::ClayMask)
    }
}

impl fmt::Display for IngredientCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The operating mode of the facial device for a given step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeviceMode {
    #[default]
    #[serde(rename = "None")]
    None,
    #[serde(rename = "Air Shot Mode")]
    AirShot,
    #[serde(rename = "Booster Mode")]
    Booster,
    #[serde(rename = "MC (Microcurrent) / Derma Shot")]
    McDerma,
}

impl DeviceMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::AirShot => "Air Shot Mode",
            Self::Booster => "Booster Mode",
            Self::McDerma => "MC (Microcurrent) / Derma Shot",
        }
    }
}

impl fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The treatment theme of a night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CycleDay {
    #[serde(rename = "Exfoliation Night")]
    Exfoliation,
    #[serde(rename = "Retinoid Night")]
    Retinoid,
    #[serde(rename = "Recovery Night")]
    Recovery,
}

impl CycleDay {
    pub fn label(self) -> &'static str {
        match self {
            Self::Exfoliation => "Exfoliation Night",
            Self::Retinoid => "Retinoid Night",
            Self::Recovery => "Recovery Night",
        }
    }
}

impl fmt::Display for CycleDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the user wants tonight's routine to focus on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SkinGoal {
    #[default]
    #[serde(rename = "Clear Pores", alias = "ClearPores")]
    ClearPores,
    #[serde(rename = "Anti-Aging", alias = "AntiAging")]
    AntiAging,
    #[serde(rename = "Texture/Glow", alias = "Glow")]
    Glow,
    #[serde(rename = "Barrier Repair", alias = "BarrierRepair")]
    BarrierRepair,
}

impl SkinGoal {
    pub fn label(self) -> &'static str {
        match self {
            Self::ClearPores => "Clear Pores",
            Self::AntiAging => "Anti-Aging",
            Self::Glow => "Texture/Glow",
            Self::BarrierRepair => "Barrier Repair",
        }
    }
}

impl fmt::Display for SkinGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which rule of the generator emitted a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineSlot {
    Cleanse,
    AirShot,
    Prep,
    Treat,
    Hydrate,
    Moisturize,
}

//=========================================================================================
// Records
//=========================================================================================

/// A product on the user's shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub category: IngredientCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_ingredients: Option<Vec<String>>,
}

impl Product {
    /// Builds a shelf product from a classification result with a fresh identifier.
    pub fn from_analysis(analysis: ProductAnalysis) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: analysis.name,
            brand: analysis.brand,
            category: analysis.category,
            image_url: analysis.image_url,
            active_ingredients: Some(analysis.active_ingredients),
        }
    }
}

/// One routine step as it was performed. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageLogEntry {
    pub date: DateTime<Utc>,
    pub device_mode: DeviceMode,
    pub category_used: IngredientCategory,
}

/// A single step of a generated routine. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineStep {
    pub step: u32,
    pub slot: RoutineSlot,
    pub product: Product,
    pub device_mode: DeviceMode,
    pub level: u8,
    pub why: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guru_insight: Option<String>,
}

//=========================================================================================
// Classification Contract
//=========================================================================================

/// What the classifier is asked about: a photo, or a manually typed brand and name.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductQuery {
    Image(Bytes),
    Manual { brand: String, name: String },
}

impl ProductQuery {
    /// A manual query with a blank brand or name is declined before classification.
    pub fn is_incomplete(&self) -> bool {
        match self {
            Self::Image(_) => false,
            Self::Manual { brand, name } => brand.trim().is_empty() || name.trim().is_empty(),
        }
    }
}

/// The structured answer of the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAnalysis {
    pub brand: String,
    pub name: String,
    pub category: IngredientCategory,
    pub active_ingredients: Vec<String>,
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_round_trip_through_from_label() {
        for category in IngredientCategory::ALL {
            assert_eq!(IngredientCategory::from_label(category.label()), category);
        }
    }

    #[test]
    fn from_label_is_lenient() {
        assert_eq!(
            IngredientCategory::from_label("  direct acid / exfoliant "),
            IngredientCategory::AcidExfoliant
        );
        assert_eq!(IngredientCategory::from_label("ClayMask"), IngredientCategory::ClayMask);
        assert_eq!(IngredientCategory::from_label("Sunscreen"), IngredientCategory::Unknown);
        assert_eq!(IngredientCategory::from_label(""), IngredientCategory::Unknown);
    }

    #[test]
    fn product_json_uses_stored_shape() {
        let json = r#"{
            "id": "abc",
            "name": "Glow Toner",
            "brand": "Cosrx",
            "category": "Direct Acid / Exfoliant",
            "activeIngredients": ["7% AHA"]
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.category, IngredientCategory::AcidExfoliant);
        assert_eq!(product.image_url, None);

        let back = serde_json::to_value(&product).unwrap();
        assert_eq!(back["activeIngredients"][0], "7% AHA");
        assert!(back.get("imageUrl").is_none());
    }

    #[test]
    fn unknown_category_label_deserializes_as_unknown() {
        let json = r#"{"id":"x","name":"Mist","brand":"B","category":"Sunscreen"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.category, IngredientCategory::Unknown);
    }

    #[test]
    fn usage_log_entry_reads_browser_iso_dates() {
        let json = r#"{
            "date": "2024-03-02T21:15:00.000Z",
            "deviceMode": "Air Shot Mode",
            "categoryUsed": "Cleanser"
        }"#;
        let entry: UsageLogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.device_mode, DeviceMode::AirShot);
        assert_eq!(entry.date.date_naive().to_string(), "2024-03-02");
    }

    #[test]
    fn manual_query_with_blank_field_is_incomplete() {
        let blank = ProductQuery::Manual { brand: "  ".into(), name: "Serum".into() };
        let full = ProductQuery::Manual { brand: "Anua".into(), name: "Toner".into() };
        assert!(blank.is_incomplete());
        assert!(!full.is_incomplete());
        assert!(!ProductQuery::Image(Bytes::from_static(b"\xff\xd8")).is_incomplete());
    }

    #[test]
    fn from_analysis_assigns_unique_ids() {
        let analysis = ProductAnalysis {
            brand: "Anua".into(),
            name: "Heartleaf Toner".into(),
            category: IngredientCategory::SoothingBarrier,
            active_ingredients: vec!["Heartleaf 77%".into()],
            image_url: None,
        };
        let a = Product::from_analysis(analysis.clone());
        let b = Product::from_analysis(analysis);
        assert_ne!(a.id, b.id);
        assert_eq!(a.active_ingredients.as_deref(), Some(&["Heartleaf 77%".to_string()][..]));
    }
}
