pub mod status;
pub mod sync;

pub use status::status;
pub use sync::sync;
