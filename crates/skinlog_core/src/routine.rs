//! crates/skinlog_core/src/routine.rs
//!
//! The routine rule engine. Resolves tonight's cycle day from the usage history and
//! assembles the ordered routine from the shelf.
//!
//! Step assembly is a fixed sequence of slot rules. Each rule looks at the inputs and
//! the steps emitted so far and either contributes one step or nothing. Step numbers
//! are handed out as steps are emitted, so skipped slots leave no gaps.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::domain::{
    CycleDay, DeviceMode, IngredientCategory, Product, RoutineSlot, RoutineStep, SkinGoal,
    UsageLogEntry,
};
use crate::history::{analyze_history, unique_days, HistoryAnalysis};

/// Humidity (percent) above which the Air Shot step is recommended.
pub const HUMID_THRESHOLD: u8 = 70;

/// Stable identifier of the synthesized Air Shot pseudo-product.
pub const AIR_SHOT_PRODUCT_ID: &str = "medicube-as";

//=========================================================================================
// Cycle Resolution
//=========================================================================================

/// Resolves the treatment theme of tonight. First matching rule wins.
pub fn resolve_cycle(
    analysis: &HistoryAnalysis,
    goal: SkinGoal,
    history: &[UsageLogEntry],
) -> CycleDay {
    if analysis.used_exfoliant_yesterday {
        return CycleDay::Recovery;
    }
    if goal == SkinGoal::BarrierRepair {
        return CycleDay::Recovery;
    }
    if history.is_empty() {
        return CycleDay::Exfoliation;
    }

    let days = unique_days(history);
    let cycle = match days % 4 {
        0 => CycleDay::Exfoliation,
        1 => CycleDay::Retinoid,
        _ => CycleDay::Recovery,
    };
    debug!(unique_days = days, ?cycle, "Resolved cycle from usage history");
    cycle
}

//=========================================================================================
// Step Assembly
//=========================================================================================

/// Everything the generator depends on, passed explicitly.
#[derive(Debug, Clone, Copy)]
pub struct RoutineContext<'a> {
    pub shelf: &'a [Product],
    pub goal: SkinGoal,
    pub device_enabled: bool,
    /// Ambient relative humidity, in percent.
    pub humidity: u8,
    pub cycle: CycleDay,
    pub analysis: &'a HistoryAnalysis,
}

impl RoutineContext<'_> {
    fn first_of(&self, category: IngredientCategory) -> Option<&Product> {
        self.shelf.iter().find(|p| p.category == category)
    }

    /// Acids win over retinoids should both ever be allowed on the same night.
    fn allowed_treatments(&self) -> (bool, bool) {
        let allow_acids = self.cycle == CycleDay::Exfoliation;
        let mut allow_retinoids = self.cycle == CycleDay::Retinoid;
        if allow_acids && allow_retinoids {
            allow_retinoids = false;
        }
        (allow_acids, allow_retinoids)
    }
}

/// A step before it has been numbered.
#[derive(Debug, Clone)]
struct StepDraft {
    slot: RoutineSlot,
    product: Product,
    device_mode: DeviceMode,
    level: u8,
    why: String,
    guru_insight: Option<String>,
}

impl StepDraft {
    fn new(slot: RoutineSlot, product: &Product, level: u8, why: &str, insight: &str) -> Self {
        Self {
            slot,
            product: product.clone(),
            device_mode: DeviceMode::None,
            level,
            why: why.to_string(),
            guru_insight: Some(insight.to_string()),
        }
    }

    fn with_device(mut self, mode: DeviceMode) -> Self {
        self.device_mode = mode;
        self
    }

    fn numbered(self, step: u32) -> RoutineStep {
        RoutineStep {
            step,
            slot: self.slot,
            product: self.product,
            device_mode: self.device_mode,
            level: self.level,
            why: self.why,
            guru_insight: self.guru_insight,
        }
    }
}

type SlotRule = fn(&RoutineContext<'_>, &[RoutineStep]) -> Option<StepDraft>;

const SLOT_RULES: [SlotRule; 6] = [cleanse, air_shot, prep, treat, hydrate, moisturize];

/// Builds tonight's routine from scratch. An empty shelf gives an empty routine.
pub fn generate_routine(ctx: &RoutineContext<'_>) -> Vec<RoutineStep> {
    let mut steps: Vec<RoutineStep> = Vec::new();
    if ctx.shelf.is_empty() {
        return steps;
    }

    for rule in SLOT_RULES {
        if let Some(draft) = rule(ctx, &steps) {
            let number = steps.len() as u32 + 1;
            debug!(
                step = number,
                slot = ?draft.slot,
                product = %draft.product.name,
                "Emitting routine step"
            );
            steps.push(draft.numbered(number));
        }
    }
    steps
}

fn cleanse(ctx: &RoutineContext<'_>, _prior: &[RoutineStep]) -> Option<StepDraft> {
    let cleanser = ctx.first_of(IngredientCategory::Cleanser)?;
    Some(StepDraft::new(
        RoutineSlot::Cleanse,
        cleanser,
        0,
        "Start with a clean canvas. Emulsify thoroughly.",
        "Double cleansing is the secret to the \"Glass Skin\" look.",
    ))
}

/// The Air Shot step is a device mode, not a shelf item.
pub fn air_shot_product() -> Product {
    Product {
        id: AIR_SHOT_PRODUCT_ID.to_string(),
        name: "Air Shot Mode".to_string(),
        brand: "Medicube".to_string(),
        category: IngredientCategory::AcidExfoliant,
        image_url: None,
        active_ingredients: None,
    }
}

fn air_shot(ctx: &RoutineContext<'_>, _prior: &[RoutineStep]) -> Option<StepDraft> {
    if !ctx.device_enabled || ctx.analysis.air_shot_cooldown {
        return None;
    }
    let humid = ctx.humidity > HUMID_THRESHOLD;
    if !humid && ctx.goal != SkinGoal::ClearPores {
        return None;
    }

    let insight = if humid {
        "Humidity is high; keeping pores clear is priority."
    } else {
        "Clear Pores goal: a light Air Shot pass lifts sebum before actives."
    };
    Some(
        StepDraft::new(
            RoutineSlot::AirShot,
            &air_shot_product(),
            1,
            "Use on completely dry skin before toner. Brush tip lightly.",
            insight,
        )
        .with_device(DeviceMode::AirShot),
    )
}

fn is_essence(product: &&Product) -> bool {
    matches!(
        product.category,
        IngredientCategory::SerumWater | IngredientCategory::SoothingBarrier
    )
}

fn find_toner<'a>(ctx: &RoutineContext<'a>) -> Option<&'a Product> {
    ctx.shelf
        .iter()
        .filter(is_essence)
        .find(|p| p.name.to_lowercase().contains("toner"))
}

fn prep(ctx: &RoutineContext<'_>, _prior: &[RoutineStep]) -> Option<StepDraft> {
    let toner = find_toner(ctx)?;
    Some(StepDraft::new(
        RoutineSlot::Prep,
        toner,
        0,
        "Hydrate and rebalance pH.",
        "Damp skin absorbs actives 10x better.",
    ))
}

fn treat(ctx: &RoutineContext<'_>, _prior: &[RoutineStep]) -> Option<StepDraft> {
    let (allow_acids, allow_retinoids) = ctx.allowed_treatments();

    if allow_acids {
        let exfoliant = ctx
            .first_of(IngredientCategory::AcidExfoliant)
            .or_else(|| ctx.first_of(IngredientCategory::ClayMask))?;
        let why = if exfoliant.category == IngredientCategory::ClayMask {
            "Deep pore suction. Wash off after 10 mins."
        } else {
            "Chemical desquamation."
        };
        return Some(StepDraft::new(
            RoutineSlot::Treat,
            exfoliant,
            0,
            why,
            "We are using this instead of Retinol tonight to avoid irritation.",
        ));
    }

    if allow_retinoids {
        let retinol = ctx.first_of(IngredientCategory::Retinoid)?;
        let insight = "Anti-aging powerhouse. We keep the device level low to prevent redness.";
        let draft = if ctx.device_enabled {
            StepDraft::new(
                RoutineSlot::Treat,
                retinol,
                1,
                "Booster mode enhances Vitamin A delivery.",
                insight,
            )
            .with_device(DeviceMode::Booster)
        } else {
            StepDraft::new(RoutineSlot::Treat, retinol, 1, "Apply a pea-sized amount.", insight)
        };
        return Some(draft);
    }

    None
}

fn clay_mask_used(prior: &[RoutineStep]) -> bool {
    prior.iter().any(|step| {
        step.slot == RoutineSlot::Treat && step.product.category == IngredientCategory::ClayMask
    })
}

fn hydrate(ctx: &RoutineContext<'_>, prior: &[RoutineStep]) -> Option<StepDraft> {
    let toner_id = find_toner(ctx).map(|t| t.id.as_str());
    let serum = ctx.shelf.iter().filter(is_essence).find(|p| {
        Some(p.id.as_str()) != toner_id && !prior.iter().any(|step| step.product.id == p.id)
    })?;

    let after_clay = clay_mask_used(prior);
    let insight = if after_clay {
        "Skipping Booster Mode after Clay Mask to protect barrier."
    } else {
        "Hyaluronic acid loves Booster mode."
    };

    let draft = if ctx.device_enabled && !after_clay {
        StepDraft::new(
            RoutineSlot::Hydrate,
            serum,
            3,
            "Drive moisture deep into the dermis.",
            insight,
        )
        .with_device(DeviceMode::Booster)
    } else {
        StepDraft::new(RoutineSlot::Hydrate, serum, 3, "Pat gently.", insight)
    };
    Some(draft)
}

fn moisturize(ctx: &RoutineContext<'_>, _prior: &[RoutineStep]) -> Option<StepDraft> {
    let moisturizer = ctx.first_of(IngredientCategory::Moisturizer)?;
    let insight = "The cream acts as a conductor for the EMS/Microcurrent.";

    if !ctx.device_enabled {
        return Some(StepDraft::new(
            RoutineSlot::Moisturize,
            moisturizer,
            2,
            "Seal it all in.",
            insight,
        ));
    }

    let why = if ctx.goal == SkinGoal::AntiAging {
        "Use Derma Shot on jawline and masseters for lifting."
    } else {
        "Use Microcurrent with upward pulling motions."
    };
    Some(
        StepDraft::new(RoutineSlot::Moisturize, moisturizer, 2, why, insight)
            .with_device(DeviceMode::McDerma),
    )
}

//=========================================================================================
// Full Plan
//=========================================================================================

/// Tonight's plan: the derived facts plus the generated steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutinePlan {
    pub cycle: CycleDay,
    pub goal: SkinGoal,
    pub device_enabled: bool,
    pub humidity: u8,
    /// An exfoliant was used yesterday, so actives are paused tonight.
    pub recovery_enforced: bool,
    pub analysis: HistoryAnalysis,
    pub steps: Vec<RoutineStep>,
}

/// Analyzes the history, resolves the cycle and generates the routine in one go.
pub fn plan_routine(
    shelf: &[Product],
    history: &[UsageLogEntry],
    goal: SkinGoal,
    device_enabled: bool,
    humidity: u8,
    now: DateTime<Utc>,
) -> RoutinePlan {
    let analysis = analyze_history(history, now);
    let cycle = resolve_cycle(&analysis, goal, history);
    let steps = generate_routine(&RoutineContext {
        shelf,
        goal,
        device_enabled,
        humidity,
        cycle,
        analysis: &analysis,
    });

    RoutinePlan {
        cycle,
        goal,
        device_enabled,
        humidity,
        recovery_enforced: analysis.used_exfoliant_yesterday,
        analysis,
        steps,
    }
}

/// Plain-text rendering of a routine suitable for pasting into a chat.
pub fn share_text(steps: &[RoutineStep], goal: SkinGoal, date: NaiveDate) -> String {
    let mut text = format!(
        "My SkinLog Routine - {}\nTarget: {}\n\n",
        date.format("%Y-%m-%d"),
        goal
    );
    for step in steps {
        text.push_str(&format!("{}. {} {}", step.step, step.product.brand, step.product.name));
        if step.device_mode != DeviceMode::None {
            text.push_str(&format!(" [{}]", step.device_mode));
        }
        text.push('\n');
    }
    text.push_str("\nGenerated by SkinLog");
    text
}
