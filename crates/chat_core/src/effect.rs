#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Hand the raw input to the pipeline as a new exchange.
    SubmitQuestion {
        exchange_id: crate::ExchangeId,
        text: String,
    },
}
