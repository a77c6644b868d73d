pub mod poll;
pub mod request;

pub use poll::*;
pub use request::*;
