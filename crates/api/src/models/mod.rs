pub mod identifier;
pub mod kind;
pub mod modifiers;
pub mod parse_tree;
pub mod type_ref;

pub use identifier::*;
pub use kind::*;
pub use modifiers::*;
pub use parse_tree::*;
pub use type_ref::*;
