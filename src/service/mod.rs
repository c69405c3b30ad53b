pub mod client;
pub mod listener;

pub use listener::Listener;
