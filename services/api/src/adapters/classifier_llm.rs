//! services/api/src/adapters/classifier_llm.rs
//!
//! This module contains the adapter for the product classification LLM.
//! It implements the `ProductClassificationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, ImageDetail, ImageUrlArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use serde::Deserialize;
use skinlog_core::{
    domain::{IngredientCategory, ProductAnalysis, ProductQuery},
    ports::{AnalysisError, ProductClassificationService},
};
use tracing::{debug, error};

const SYSTEM_INSTRUCTIONS: &str = "You are a skincare product analyst. You identify products \
from photos or names and answer strictly with a single JSON object.";

const CATEGORY_LIST: &str = r#"Categories available:
- Retinoid
- Direct Acid / Exfoliant
- Clay / Detox Mask
- Soothing / Barrier
- Cleanser
- Moisturizer
- Water-based Serum

Return JSON with:
- brand
- name
- category
- activeIngredients (Array of strings)"#;

/// Curated photo ids used as the display image of each category.
fn category_image_id(category: IngredientCategory) -> &'static str {
    match category {
        IngredientCategory::Retinoid => "1556229010-6c3f2c9ca5f8",
        IngredientCategory::AcidExfoliant => "1556228720-3f0f98f395d3",
        IngredientCategory::ClayMask => "1596755094514-f87034a31217",
        IngredientCategory::SoothingBarrier => "1556228578-0d85b1a4d571",
        IngredientCategory::Cleanser => "1559539751-24021209ff0e",
        IngredientCategory::Moisturizer => "1612817288484-6f9160082884",
        IngredientCategory::SerumWater => "1601049541240-f44d82701974",
        IngredientCategory::Unknown => "1556229162-d227b204642d",
    }
}

pub fn category_image_url(category: IngredientCategory) -> String {
    format!(
        "https://images.unsplash.com/photo-{}?auto=format&fit=crop&q=80&w=400&h=400",
        category_image_id(category)
    )
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ProductClassificationService` using an OpenAI-compatible
/// vision model.
#[derive(Clone)]
pub struct OpenAiClassifierAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiClassifierAdapter {
    /// Creates a new `OpenAiClassifierAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    fn build_user_message(
        query: &ProductQuery,
    ) -> Result<ChatCompletionRequestMessage, OpenAIError> {
        let text_part: ChatCompletionRequestUserMessageContentPart =
            ChatCompletionRequestMessageContentPartTextArgs::default()
                .text(user_prompt(query))
                .build()?
                .into();

        let mut parts = vec![text_part];
        if let ProductQuery::Image(bytes) = query {
            let data_url = format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes));
            let image_part: ChatCompletionRequestUserMessageContentPart =
                ChatCompletionRequestMessageContentPartImageArgs::default()
                    .image_url(
                        ImageUrlArgs::default()
                            .url(data_url)
                            .detail(ImageDetail::Auto)
                            .build()?,
                    )
                    .build()?
                    .into();
            parts.insert(0, image_part);
        }

        Ok(ChatCompletionRequestUserMessageArgs::default()
            .content(parts)
            .build()?
            .into())
    }
}

/// The instruction text for either kind of query.
pub fn user_prompt(query: &ProductQuery) -> String {
    let lead = match query {
        ProductQuery::Image(_) => "Analyze this skincare product image. \
             Identify the brand, product name, and category.\n\
             Also, extract the top 2-3 key active ingredients \
             (e.g. \"15% Vitamin C\", \"2% BHA\")."
            .to_string(),
        ProductQuery::Manual { brand, name } => format!(
            "For the skincare product \"{} {}\", identify its category \
             and the top 2-3 key active ingredients it is known for.",
            brand.trim(),
            name.trim()
        ),
    };
    format!("{}\n\n{}", lead, CATEGORY_LIST)
}

//=========================================================================================
// Response Parsing
//=========================================================================================

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    brand: Option<String>,
    name: Option<String>,
    category: Option<String>,
    #[serde(alias = "active_ingredients")]
    active_ingredients: Option<Vec<String>>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Turns the model's text answer into a `ProductAnalysis`.
///
/// Missing brand or name fall back to what the user typed, then to placeholders.
pub fn parse_analysis(text: &str, query: &ProductQuery) -> Result<ProductAnalysis, AnalysisError> {
    let fence = Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$")
        .map_err(|e| AnalysisError::Unparsable(e.to_string()))?;
    let body = fence
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or(text.trim(), |m| m.as_str());

    let raw: RawAnalysis =
        serde_json::from_str(body).map_err(|e| AnalysisError::Unparsable(e.to_string()))?;

    let (typed_brand, typed_name) = match query {
        ProductQuery::Manual { brand, name } => (Some(brand.clone()), Some(name.clone())),
        ProductQuery::Image(_) => (None, None),
    };

    let category = raw
        .category
        .as_deref()
        .map_or(IngredientCategory::Unknown, IngredientCategory::from_label);

    Ok(ProductAnalysis {
        brand: non_blank(raw.brand)
            .or_else(|| non_blank(typed_brand))
            .unwrap_or_else(|| "Unknown Brand".to_string()),
        name: non_blank(raw.name)
            .or_else(|| non_blank(typed_name))
            .unwrap_or_else(|| "Unknown Product".to_string()),
        category,
        active_ingredients: raw.active_ingredients.unwrap_or_default(),
        image_url: Some(category_image_url(category)),
    })
}

//=========================================================================================
// `ProductClassificationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProductClassificationService for OpenAiClassifierAdapter {
    /// Asks the model to identify the product and parses its JSON answer.
    async fn classify(&self, query: &ProductQuery) -> Result<ProductAnalysis, AnalysisError> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| AnalysisError::Request(e.to_string()))?
                .into(),
            Self::build_user_message(query).map_err(|e| AnalysisError::Request(e.to_string()))?,
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .response_format(ResponseFormat::JsonObject)
            .n(1)
            .build()
            .map_err(|e| AnalysisError::Request(e.to_string()))?;

        // Call the API and manually map the error, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| {
                error!("Classification request failed: {}", e);
                AnalysisError::Request(e.to_string())
            })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AnalysisError::Request("Classifier returned no content.".to_string())
            })?;
        debug!("Classifier answered: {}", content);

        parse_analysis(&content, query)
    }
}
