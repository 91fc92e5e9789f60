//! Chat core: pure widget state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{AppState, Author, Bubble, ExchangeId, SimilarLine, StatusKind, StatusStyle};
pub use update::update;
pub use view_model::ChatViewModel;
