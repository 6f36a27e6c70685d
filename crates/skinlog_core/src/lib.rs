pub mod domain;
pub mod history;
pub mod logbook;
pub mod ports;
pub mod routine;
pub mod shelf;

#[cfg(test)]
mod testing;

pub use domain::{
    CycleDay, DeviceMode, IngredientCategory, Product, ProductAnalysis, ProductQuery, RoutineSlot,
    RoutineStep, SkinGoal, UsageLogEntry,
};
pub use history::{analyze_history, HistoryAnalysis};
pub use ports::{AnalysisError, PortError, PortResult, ProductClassificationService, StorageService};
pub use routine::{
    generate_routine, plan_routine, resolve_cycle, share_text, RoutineContext, RoutinePlan,
};
pub use shelf::ShelfError;
