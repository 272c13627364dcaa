#![forbid(unsafe_code)]

pub mod model;
pub mod navigation;
pub mod time;

pub use navigation::{NavigationState, find_item_index_by_date};
pub use time::Clock;
