pub mod example;
pub mod purpose;

pub use example::{Batch, Example, PaddedExample};
pub use purpose::Purpose;
