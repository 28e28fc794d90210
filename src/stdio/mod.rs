//! Persistent line-oriented scoring loop.
//!
//! Keeps one model loaded for a long-lived parent process. Each input line is a JSON
//! object `{"id"?, "answer", "correct_answer"}`; each output line is
//! `{"id"?, "similarity"}` or `{"id"?, "error"}`. A bad line never ends the loop.

use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::scoring::AnswerScorer;

const INVALID_INPUT: &str = "Invalid input";

#[derive(Debug, Deserialize)]
struct LineRequest {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    correct_answer: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LineResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LineResponse {
    fn scored(id: Option<Value>, similarity: f32) -> Self {
        Self {
            id,
            similarity: Some(similarity),
            error: None,
        }
    }

    fn failed(id: Option<Value>, error: impl Into<String>) -> Self {
        Self {
            id,
            similarity: None,
            error: Some(error.into()),
        }
    }
}

/// Counters reported when the loop ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    pub processed: u64,
    pub failed: u64,
}

/// Handles a single input line.
pub fn handle_line<S: AnswerScorer + ?Sized>(scorer: &S, line: &str) -> LineResponse {
    let request: LineRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "Malformed request line");
            return LineResponse::failed(None, INVALID_INPUT);
        }
    };

    let (Some(answer), Some(correct_answer)) = (
        request.answer.filter(|s| !s.is_empty()),
        request.correct_answer.filter(|s| !s.is_empty()),
    ) else {
        return LineResponse::failed(request.id, INVALID_INPUT);
    };

    match scorer.similarity(&answer, &correct_answer) {
        Ok(similarity) => LineResponse::scored(request.id, similarity),
        Err(e) => {
            warn!(error = %e, "Scoring failed");
            LineResponse::failed(request.id, e.to_string())
        }
    }
}

/// Reads requests until EOF, writing one response line per request.
pub fn run_loop<S, R, W>(scorer: &S, input: R, mut output: W) -> io::Result<LoopStats>
where
    S: AnswerScorer + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut stats = LoopStats::default();
    info!("Scoring loop started, reading requests from stdin");

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = handle_line(scorer, line);
        stats.processed += 1;
        if response.error.is_some() {
            stats.failed += 1;
        }

        serde_json::to_writer(&mut output, &response)?;
        output.write_all(b"\n")?;
        output.flush()?;
    }

    info!(
        processed = stats.processed,
        failed = stats.failed,
        "Input closed, scoring loop finished"
    );
    Ok(stats)
}
