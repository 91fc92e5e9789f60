#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chat_pipeline::{
    DisplayEvent, EventSink, RefinementResult, ServiceError, SimilarityMatch, SimilarityResult,
    QuestionService, ValidationResult,
};

#[derive(Default)]
pub struct TestSink {
    events: Arc<Mutex<Vec<DisplayEvent>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<DisplayEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: DisplayEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Validate(String),
    Refine { question: String, feedback: String },
    Similar(String),
}

/// Answers each stage with a canned result and records what it was asked.
pub struct ScriptedService {
    pub validation: Result<ValidationResult, ServiceError>,
    pub refinement: Result<RefinementResult, ServiceError>,
    pub similarity: Result<SimilarityResult, ServiceError>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedService {
    pub fn valid(revised: &str, matches: Vec<(&str, f64)>) -> Self {
        Self {
            validation: Ok(ValidationResult {
                is_valid: true,
                reason: None,
            }),
            refinement: Ok(RefinementResult {
                revised_question: revised.to_string(),
                issues_fixed: Vec::new(),
            }),
            similarity: Ok(matches
                .into_iter()
                .map(|(question, score)| SimilarityMatch {
                    question: question.to_string(),
                    score,
                })
                .collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn invalid(reason: &str) -> Self {
        Self {
            validation: Ok(ValidationResult {
                is_valid: false,
                reason: Some(reason.to_string()),
            }),
            ..Self::valid("unused", Vec::new())
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl QuestionService for ScriptedService {
    async fn validate(&self, message: &str) -> Result<ValidationResult, ServiceError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Validate(message.to_string()));
        self.validation.clone()
    }

    async fn refine(
        &self,
        question: &str,
        feedback: &str,
    ) -> Result<RefinementResult, ServiceError> {
        self.calls.lock().unwrap().push(Call::Refine {
            question: question.to_string(),
            feedback: feedback.to_string(),
        });
        self.refinement.clone()
    }

    async fn similar(&self, question: &str) -> Result<SimilarityResult, ServiceError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Similar(question.to_string()));
        self.similarity.clone()
    }
}
