use std::fmt;

pub type ExchangeId = u64;

/// Prompt shown once a message has gone through all three stages.
pub const FEEDBACK_PROMPT: &str =
    "Would you like to refine further? Provide feedback or type ACCEPT.";

/// One sequential remote call of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Validate,
    Refine,
    Similarity,
}

impl Stage {
    /// Endpoint name, relative to the service base URL.
    pub fn endpoint(self) -> &'static str {
        match self {
            Stage::Validate => "chat",
            Stage::Refine => "refine",
            Stage::Similarity => "similarity",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Validate => write!(f, "validating"),
            Stage::Refine => write!(f, "refining"),
            Stage::Similarity => write!(f, "checking similarity"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefinementResult {
    pub revised_question: String,
    /// Reported by the backend, never displayed.
    pub issues_fixed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatch {
    pub question: String,
    pub score: f64,
}

pub type SimilarityResult = Vec<SimilarityMatch>;

/// Display form of a similarity match: score fixed to two decimals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchLine {
    pub question: String,
    pub score: String,
}

impl From<&SimilarityMatch> for MatchLine {
    fn from(m: &SimilarityMatch) -> Self {
        Self {
            question: m.question.clone(),
            score: two_decimals(m.score),
        }
    }
}

/// Fixed two-decimal form with exact ties rounded away from zero.
///
/// `{:.2}` rounds ties to even (`0.125` gives `0.12`); scores are shown the
/// way a browser's `toFixed(2)` shows them (`0.13`).
fn two_decimals(value: f64) -> String {
    // A double lies exactly halfway between two hundredths only when it is an
    // odd multiple of 1/8, and scaling by 8 is exact.
    let eighths = value * 8.0;
    let is_tie = eighths.is_finite() && eighths.fract() == 0.0 && eighths % 2.0 != 0.0;
    if !is_tie {
        return format!("{value:.2}");
    }
    let hundredths = (value.abs() * 100.0 + 0.5).floor().copysign(value);
    format!("{:.2}", hundredths / 100.0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid { reason: Option<String> },
}

/// A unit of output for the rendering side, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    UserEcho(String),
    /// A stage request is in flight; drives typing indicators.
    StatusUpdate(Stage),
    ValidationOutcome(ValidationOutcome),
    RefinementOutcome(String),
    /// Empty when no similar questions were found.
    SimilarityOutcome(Vec<MatchLine>),
    Prompt(String),
}

/// How a `run` ended when no transport failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Blank input; nothing was emitted or sent.
    Ignored,
    /// The backend judged the question invalid.
    Rejected,
    /// All three stages ran and the feedback prompt was emitted.
    Completed,
}

/// Events published by the background pipeline handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    Display {
        exchange_id: ExchangeId,
        event: DisplayEvent,
    },
    Finished {
        exchange_id: ExchangeId,
        result: Result<RunOutcome, PipelineError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    /// The request body could not be encoded.
    InvalidRequest,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    MalformedResponse,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::InvalidRequest => write!(f, "invalid request body"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::MalformedResponse => write!(f, "malformed response"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// A remote call that did not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    pub kind: FailureKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Transport failure tagged with the stage that hit it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{stage} failed ({kind}): {message}")]
pub struct PipelineError {
    pub stage: Stage,
    pub kind: FailureKind,
    pub message: String,
}

impl PipelineError {
    pub fn at(stage: Stage, err: ServiceError) -> Self {
        Self {
            stage,
            kind: err.kind,
            message: err.message,
        }
    }
}
