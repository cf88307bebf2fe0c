pub mod quiz_provider;
pub mod result_sink;

pub use quiz_provider::{HttpQuizProvider, QuizProvider};
pub use result_sink::{HttpResultSink, ResultSink};

#[cfg(test)]
pub use quiz_provider::MockQuizProvider;
#[cfg(test)]
pub use result_sink::MockResultSink;
