pub mod catalog;
pub mod fields;
pub mod network_segment;
pub mod server;
pub mod table;
pub mod types;

pub use catalog::*;
pub use fields::*;
pub use table::*;
pub use types::*;
