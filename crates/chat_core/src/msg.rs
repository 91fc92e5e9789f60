#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the message input box.
    InputChanged(String),
    /// User pressed Send (or Enter).
    SendClicked,
    /// User asked to leave; honored once no exchange is in flight.
    QuitRequested,
    /// Pipeline echoed the submitted message.
    UserEchoed(String),
    /// Pipeline started a stage request.
    StatusShown(crate::StatusKind),
    /// Backend verdict on the question.
    Validated { valid: bool, reason: Option<String> },
    /// Backend's revised question.
    Refined(String),
    /// Similar questions, empty when none were found.
    SimilarFound(Vec<crate::SimilarLine>),
    /// Closing prompt of a completed exchange.
    PromptShown(String),
    /// Pipeline finished an exchange without a transport failure.
    ExchangeFinished { exchange_id: crate::ExchangeId },
    /// A stage request failed; the exchange is over.
    ExchangeFailed {
        exchange_id: crate::ExchangeId,
        stage: crate::StatusKind,
        message: String,
    },
    /// Render tick to coalesce redraws.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
