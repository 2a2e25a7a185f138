pub mod caption;
pub mod chat;
pub mod common;
pub mod image;
pub mod meme;

pub use self::caption::*;
pub use self::chat::*;
pub use self::common::*;
pub use self::image::*;
pub use self::meme::*;
