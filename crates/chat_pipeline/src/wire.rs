//! JSON bodies exchanged with the question backend.
//!
//! Response decoding is tolerant of the shapes the backend has shipped over
//! time: similarity matches carry their question either at the top level or
//! nested under `meta`, and a missing `similar` list means no matches.

use serde::{Deserialize, Serialize};

use crate::{
    FailureKind, RefinementResult, ServiceError, SimilarityMatch, SimilarityResult,
    ValidationResult,
};

#[derive(Debug, Serialize)]
pub struct ValidateRequest<'a> {
    pub message: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RefineRequest<'a> {
    pub question: &'a str,
    pub feedback: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SimilarityRequest<'a> {
    pub question: &'a str,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    validation: ValidationBody,
}

#[derive(Debug, Deserialize)]
struct ValidationBody {
    is_valid: bool,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefineResponse {
    refined_answer: RefinedBody,
}

#[derive(Debug, Deserialize)]
struct RefinedBody {
    revised_question: String,
    #[serde(default)]
    issues_fixed: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SimilarityResponse {
    #[serde(default)]
    similar: Option<Vec<RawMatch>>,
}

#[derive(Debug, Deserialize)]
struct RawMatch {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    meta: Option<MatchMeta>,
    score: f64,
}

#[derive(Debug, Deserialize)]
struct MatchMeta {
    #[serde(default)]
    question: Option<String>,
}

impl RawMatch {
    fn normalize(self) -> Result<SimilarityMatch, ServiceError> {
        let question = self
            .question
            .or_else(|| self.meta.and_then(|meta| meta.question))
            .ok_or_else(|| {
                ServiceError::new(
                    FailureKind::MalformedResponse,
                    "similarity match without a question",
                )
            })?;
        Ok(SimilarityMatch {
            question,
            score: self.score,
        })
    }
}

pub fn decode_validation(body: &[u8]) -> Result<ValidationResult, ServiceError> {
    let response: ValidateResponse = parse(body)?;
    let ValidationBody { is_valid, reason } = response.validation;
    Ok(ValidationResult {
        is_valid,
        // A reason only means something for a rejected question.
        reason: if is_valid { None } else { reason },
    })
}

pub fn decode_refinement(body: &[u8]) -> Result<RefinementResult, ServiceError> {
    let response: RefineResponse = parse(body)?;
    Ok(RefinementResult {
        revised_question: response.refined_answer.revised_question,
        issues_fixed: response.refined_answer.issues_fixed,
    })
}

pub fn decode_similarity(body: &[u8]) -> Result<SimilarityResult, ServiceError> {
    let response: SimilarityResponse = parse(body)?;
    response
        .similar
        .unwrap_or_default()
        .into_iter()
        .map(RawMatch::normalize)
        .collect()
}

fn parse<'de, T: Deserialize<'de>>(body: &'de [u8]) -> Result<T, ServiceError> {
    serde_json::from_slice(body)
        .map_err(|err| ServiceError::new(FailureKind::MalformedResponse, err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_dropped_for_valid_questions() {
        let result =
            decode_validation(br#"{"validation":{"is_valid":true,"reason":"fine"}}"#).unwrap();
        assert_eq!(
            result,
            ValidationResult {
                is_valid: true,
                reason: None
            }
        );
    }

    #[test]
    fn invalid_without_reason_is_accepted() {
        let result = decode_validation(br#"{"validation":{"is_valid":false}}"#).unwrap();
        assert!(!result.is_valid);
        assert_eq!(result.reason, None);
    }

    #[test]
    fn missing_validation_object_is_malformed() {
        let err = decode_validation(br#"{"answer":"hello"}"#).unwrap_err();
        assert_eq!(err.kind, FailureKind::MalformedResponse);
    }

    #[test]
    fn refinement_keeps_issues_when_present() {
        let result = decode_refinement(
            br#"{"refined_answer":{"revised_question":"What is 2 + 2?","issues_fixed":["spacing"]}}"#,
        )
        .unwrap();
        assert_eq!(result.revised_question, "What is 2 + 2?");
        assert_eq!(result.issues_fixed, vec!["spacing".to_string()]);
    }

    #[test]
    fn similarity_accepts_both_question_shapes() {
        let body = br#"{"similar":[
            {"question":"top level","score":0.91},
            {"meta":{"question":"nested","id":4},"score":0.85}
        ]}"#;
        let matches = decode_similarity(body).unwrap();
        assert_eq!(
            matches,
            vec![
                SimilarityMatch {
                    question: "top level".into(),
                    score: 0.91
                },
                SimilarityMatch {
                    question: "nested".into(),
                    score: 0.85
                },
            ]
        );
    }

    #[test]
    fn similarity_missing_or_null_list_is_empty() {
        assert!(decode_similarity(b"{}").unwrap().is_empty());
        assert!(decode_similarity(br#"{"similar":null}"#).unwrap().is_empty());
    }

    #[test]
    fn similarity_match_without_question_is_malformed() {
        let err = decode_similarity(br#"{"similar":[{"meta":{},"score":0.9}]}"#).unwrap_err();
        assert_eq!(err.kind, FailureKind::MalformedResponse);
    }

    #[test]
    fn refine_request_always_carries_feedback() {
        let body = serde_json::to_value(RefineRequest {
            question: "q",
            feedback: "",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"question": "q", "feedback": ""}));
    }
}
