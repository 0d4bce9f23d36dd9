//! Quiz session core: answer checking, hint bookkeeping and the session
//! state machine.

pub mod check;
mod hint;
mod session;

pub use check::{encode_selection, is_correct};
pub use hint::{HintCoordinator, HintTicket};
pub use session::{HintRequest, LoadTicket, Session};
