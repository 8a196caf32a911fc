pub mod stats;
pub mod tensor;
