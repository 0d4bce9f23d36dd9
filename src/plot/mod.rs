//! Function evaluation and graph sampling.

pub mod expr;
pub mod sampler;

pub use expr::{Function, ParseError};
pub use sampler::{Sample, encode_point, is_conceptual, sample, sample_body};
