pub mod export;
pub mod font;
pub mod layout;
pub mod render;

pub use export::{ExportArtifact, EXPORT_MIME};
pub use font::MemeFont;
pub use layout::{layout, RenderPlan, Surface};
pub use render::{decode_source, render, Compositor};
