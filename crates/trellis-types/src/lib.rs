pub mod event;
pub mod value;

pub use event::Event;
pub use value::{FieldKind, FieldValue};
