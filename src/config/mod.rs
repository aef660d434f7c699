//! Pipeline configuration decoding.

mod decode;

pub use decode::{decode_pipeline, decode_value, DecodeError};
