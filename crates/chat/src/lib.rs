pub mod gate;
pub mod llm;
pub mod service;
pub mod store;

pub use llm::ModelBackend;
pub use service::ChatBotService;
pub use store::HistoryStore;
