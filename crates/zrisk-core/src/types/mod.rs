//! Domain types for the ZRisk engine.

mod account;
mod scenario;
mod state;

pub use account::{months_between, Account, AccountBuilder, InterestRate, DEFAULT_PRODUCT};
pub use scenario::{check_weights, Scenario, ScenarioSet, DEFAULT_WEIGHT_TOLERANCE};
pub use state::{RatingScale, RatingState, StateKind, WRITE_OFF_STATE};
