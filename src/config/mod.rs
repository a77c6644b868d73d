pub mod longpoll;
pub mod settings;

pub use longpoll::*;
pub use settings::*;
