pub mod conv;
pub mod dense;
pub mod param;

pub use conv::Conv2d;
pub use dense::Linear;
pub use param::Param;
