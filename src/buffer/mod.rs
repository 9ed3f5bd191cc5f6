pub mod buffer_pool;
pub mod victim_list;

pub use buffer_pool::{BufferPool, Stats};
pub use victim_list::{Strategy, VictimList};
