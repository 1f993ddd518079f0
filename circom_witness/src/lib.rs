pub mod circuit;
pub mod config;
pub mod field;
pub mod input;
pub mod pipeline;
pub mod proving;
pub mod utils;
pub mod witness;
pub mod wtns;
