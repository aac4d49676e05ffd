//! Core of the Mog emoji request board.
//!
//! - `command`: slash-command text → [`ValidatedCommand`] or [`CommandError`]
//! - `ledger`: the [`DesireStore`] port and the aggregate views over it
//! - `processor`: reconciliation plus the per-action handlers
//! - `config`: layered runtime configuration

pub mod command;
pub mod config;
pub mod domain;
pub mod emoji;
pub mod errors;
pub mod ledger;
pub mod processor;

pub use command::{Action, CommandError, CommandParser, ValidatedCommand};
pub use domain::desire::{Desire, DesireId, DesireStatus};
pub use emoji::{KnownEmojiOracle, OracleError, StaticEmojiOracle};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use ledger::{DesireLedger, DesireStore, EmojiDemand, StoreError};
pub use processor::{CommandReply, RequestProcessor};
