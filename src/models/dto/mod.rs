pub mod request;
pub mod response;

pub use request::{LoginRequest, RegisterRequest, SubmitResultRequest};
pub use response::{AuthTokenResponse, QuizDocumentResponse};
