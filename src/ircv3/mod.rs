pub mod batch;
pub mod server_time;

pub use self::batch::{BatchContext, BatchRegistry};
pub use self::server_time::parse_server_time;
