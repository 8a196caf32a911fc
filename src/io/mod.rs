pub mod npy;

pub use npy::{read_npy, write_npy_2d, NpyArray};
