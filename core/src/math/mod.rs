pub mod interp;

pub use interp::InterpHelper;
