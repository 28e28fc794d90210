//! Answer similarity and quiz grading.
//!
//! [`SimilarityScorer`] embeds an answer and a reference answer and compares them
//! with [`cosine_similarity`]. [`grading`] builds per-quiz results on top of any
//! [`AnswerScorer`].

pub mod error;
pub mod grading;
pub mod scorer;
pub mod similarity;


pub use error::ScoringError;
pub use grading::{
    AnswerSubmission, BestMatch, GradedAnswer, QuizEvaluation, best_match, grade, grade_answer,
    round_half_up, to_percentage,
};
pub use scorer::{AnswerScorer, STUB_MODEL_ID, SimilarityScorer};
pub use similarity::cosine_similarity;
