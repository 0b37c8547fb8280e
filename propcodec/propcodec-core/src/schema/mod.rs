//! Type descriptors and the prop/record schemas built from them.

mod format;
mod types;

pub use format::format_prop_defs;
pub use types::{PropDef, PropDefs, RecordSchema, TypeDescriptor};
