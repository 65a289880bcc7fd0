pub mod emit;
pub mod structimpl;

pub use emit::CodeBuf;
pub use structimpl::generate_struct;
