pub mod client;
pub mod compose;
pub mod types;

pub use compose::OpenRouterCompositionClient;
