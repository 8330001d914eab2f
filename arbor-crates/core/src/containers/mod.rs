//! Index-keyed containers used by the kernel.
mod keyed_vec;
mod slot_arena;

pub use keyed_vec::*;
pub use slot_arena::*;
