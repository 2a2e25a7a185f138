pub mod data_uri;
pub mod normalizer;

pub use data_uri::{decode_image_field, DecodedImage};
pub use normalizer::ImageNormalizer;
