pub mod pending_store;
pub mod token_store;

pub use pending_store::{FilePendingStore, PendingSubmissionStore};
pub use token_store::{FileTokenStore, TokenStore};
