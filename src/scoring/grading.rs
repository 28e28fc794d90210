//! Quiz grading on top of answer similarity.
//!
//! Each question may accept several correct answers; a submission is credited
//! with its best match. Similarities are reported as percentages with two
//! decimals, and the quiz score is their mean.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::constants::MISSING_REFERENCE;

use super::error::ScoringError;
use super::scorer::AnswerScorer;

/// One student answer with the accepted reference answers for its question.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    #[serde(default)]
    pub task_text: Option<String>,
    #[serde(default)]
    pub student_answer: String,
    #[serde(default)]
    pub correct_answers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAnswer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_text: Option<String>,
    /// Reference answer the submission was credited against.
    pub correct_answer: String,
    pub student_answer: String,
    /// Percentage, two decimals.
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizEvaluation {
    pub results: Vec<GradedAnswer>,
    /// Mean of per-answer similarities, two decimals.
    pub score: f64,
}

/// Highest-scoring reference answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch {
    /// Index into the reference list (first one wins on ties).
    pub index: usize,
    pub similarity: f32,
}

/// Rounds half-up (toward positive infinity) to `decimals` places.
pub fn round_half_up(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor + 0.5).floor() / factor
}

/// Converts a cosine similarity into a percentage with two decimals.
pub fn to_percentage(similarity: f32) -> f64 {
    (f64::from(similarity) * 10_000.0 + 0.5).floor() / 100.0
}

/// Scores `answer` against every reference and returns the best one.
pub fn best_match<S: AnswerScorer + ?Sized>(
    scorer: &S,
    answer: &str,
    correct_answers: &[String],
) -> Result<BestMatch, ScoringError> {
    if correct_answers.is_empty() {
        return Err(ScoringError::invalid("no correct answers to compare against"));
    }

    let mut best: Option<BestMatch> = None;
    for (index, reference) in correct_answers.iter().enumerate() {
        let similarity = scorer.similarity(answer, reference)?;
        if similarity.is_nan() {
            return Err(ScoringError::ComputationFailed {
                reason: "invalid similarity value".to_string(),
            });
        }
        if best.is_none_or(|b| similarity > b.similarity) {
            best = Some(BestMatch { index, similarity });
        }
    }

    best.ok_or_else(|| ScoringError::invalid("no correct answers to compare against"))
}

/// Grades a single submission.
pub fn grade_answer<S: AnswerScorer + ?Sized>(
    scorer: &S,
    submission: &AnswerSubmission,
) -> Result<GradedAnswer, ScoringError> {
    let (correct_answer, similarity) = if submission.student_answer.trim().is_empty() {
        debug!(
            question_id = submission.question_id.as_deref(),
            "Blank answer, assigning similarity 0"
        );
        let reference = submission
            .correct_answers
            .first()
            .cloned()
            .unwrap_or_else(|| MISSING_REFERENCE.to_string());
        (reference, 0.0)
    } else {
        let best = best_match(scorer, &submission.student_answer, &submission.correct_answers)?;
        (
            submission.correct_answers[best.index].clone(),
            to_percentage(best.similarity),
        )
    };

    Ok(GradedAnswer {
        question_id: submission.question_id.clone(),
        task_text: submission.task_text.clone(),
        correct_answer,
        student_answer: submission.student_answer.clone(),
        similarity,
    })
}

/// Grades every submission and averages the results.
#[instrument(skip_all, fields(submissions = submissions.len()))]
pub fn grade<S: AnswerScorer + ?Sized>(
    scorer: &S,
    submissions: &[AnswerSubmission],
) -> Result<QuizEvaluation, ScoringError> {
    if submissions.is_empty() {
        return Err(ScoringError::invalid("no answers submitted"));
    }

    let results = submissions
        .iter()
        .map(|submission| grade_answer(scorer, submission))
        .collect::<Result<Vec<_>, _>>()?;

    let total: f64 = results.iter().map(|r| r.similarity).sum();
    let score = round_half_up(total / results.len() as f64, 2);

    debug!(score, "Quiz graded");

    Ok(QuizEvaluation { results, score })
}
