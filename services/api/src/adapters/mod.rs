pub mod classifier_llm;
pub mod db;
pub mod memory;

pub use classifier_llm::OpenAiClassifierAdapter;
pub use db::DbAdapter;
pub use memory::InMemoryStore;
