pub mod sentiment;
pub mod text_generation;
pub mod utils;
