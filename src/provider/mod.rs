pub mod openrouter;
pub mod traits;

pub use openrouter::OpenRouterProvider;
pub use traits::ChatProvider;
