pub mod pointer;

pub use pointer::{wire_pointer_handlers, wire_unlock_on_first_pointerdown, PointerWiring};
