pub mod disk;
pub mod frame;
pub mod open_file;

pub use frame::Frame;
pub use open_file::{OpenFileEntry, OpenFileTable};
