pub mod cursor;
pub mod mapper;

pub use cursor::{BasicType, SignatureCursor, TypeCode};
pub use mapper::{map_signature, MapCtx, StructDef, StructKey, StructRegistry, TypeBinding};
