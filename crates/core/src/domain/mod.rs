pub mod contract;
pub mod error;
pub mod questionnaire;
pub mod recommendation;
pub mod risk;
