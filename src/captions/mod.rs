pub mod extract;
pub mod orchestrator;
pub mod prompt;

pub use extract::extract_captions;
pub use orchestrator::CaptionOrchestrator;
