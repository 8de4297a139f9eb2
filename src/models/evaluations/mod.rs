pub mod entities;
pub mod requests;
pub mod responses;

pub use entities::{Evaluation, EvaluationStatus, IndividualEvaluation};
pub use requests::{EvaluationPayload, EvaluationQuery, IndividualEvaluationInput};
pub use responses::FetchEvaluationResponse;
