pub mod longpoll_port;
pub mod subscription_port;

pub use longpoll_port::LongPollPort;
pub use subscription_port::SubscriptionPort;
