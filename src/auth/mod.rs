pub mod client;
pub mod presence;

pub use client::AuthClient;
pub use presence::AuthPresence;
