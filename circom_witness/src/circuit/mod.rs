//! Loading of the compiled circuit descriptor.

pub mod descriptor;
pub mod input_hash_map;
pub mod layout;

pub use descriptor::CircuitDescriptor;
pub use input_hash_map::{fnv1a, HashSignalInfo, InputHashMap};
pub use layout::CircuitLayout;
