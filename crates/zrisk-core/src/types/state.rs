//! Rating states and the ordered rating scale.
//!
//! A [`RatingScale`] fixes the set of credit-quality states for a run. Its indices are
//! the row/column positions of every transition matrix built on it, so the scale is
//! immutable once constructed; augmenting it with a write-off state produces a new scale.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EclError, EclResult};

/// Role a rating state plays in the credit lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    /// A performing rating grade.
    Performing,
    /// Performing state that cured accounts return to.
    Cure,
    /// Default.
    Default,
    /// Terminal write-off state.
    WriteOff,
}

impl StateKind {
    /// Returns true for states that can still transition into default.
    #[must_use]
    pub fn is_performing(self) -> bool {
        matches!(self, Self::Performing | Self::Cure)
    }
}

/// A single credit-quality state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RatingState {
    /// State label, unique within a scale.
    pub name: String,
    /// Lifecycle role.
    pub kind: StateKind,
}

impl RatingState {
    /// Creates a state with the given name and role.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: StateKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Creates a performing state.
    #[must_use]
    pub fn performing(name: impl Into<String>) -> Self {
        Self::new(name, StateKind::Performing)
    }

    /// Creates a default state.
    #[must_use]
    pub fn default_state(name: impl Into<String>) -> Self {
        Self::new(name, StateKind::Default)
    }
}

impl fmt::Display for RatingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Ordered set of rating states, best quality first.
///
/// Invariants:
/// - names are unique
/// - exactly one [`StateKind::Default`] state, preceded by every performing state
/// - at most one [`StateKind::WriteOff`] state, and if present it is the last state
/// - at most one [`StateKind::Cure`] state
///
/// The ordering is what the credit-cycle transform relies on: later columns are
/// strictly more default-ward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RatingState>", into = "Vec<RatingState>")]
pub struct RatingScale {
    states: Vec<RatingState>,
    default_index: usize,
}

/// Name given to the write-off state when a scale is augmented.
pub const WRITE_OFF_STATE: &str = "WO";

impl RatingScale {
    /// Creates a scale from states ordered best to worst.
    pub fn new(states: Vec<RatingState>) -> EclResult<Self> {
        if states.is_empty() {
            return Err(EclError::configuration("rating scale has no states"));
        }

        for (i, state) in states.iter().enumerate() {
            if states[..i].iter().any(|s| s.name == state.name) {
                return Err(EclError::configuration(format!(
                    "duplicate rating state '{}'",
                    state.name
                )));
            }
        }

        let defaults: Vec<usize> = positions(&states, StateKind::Default);
        let default_index = match defaults.as_slice() {
            [index] => *index,
            [] => return Err(EclError::configuration("rating scale has no default state")),
            _ => {
                return Err(EclError::configuration(
                    "rating scale has more than one default state",
                ))
            }
        };

        let write_offs = positions(&states, StateKind::WriteOff);
        match write_offs.as_slice() {
            [] => {
                if default_index != states.len() - 1 {
                    return Err(EclError::configuration(
                        "default must be the last state when there is no write-off state",
                    ));
                }
            }
            [index] => {
                if *index != states.len() - 1 || default_index != states.len() - 2 {
                    return Err(EclError::configuration(
                        "write-off must be the last state, directly after default",
                    ));
                }
            }
            _ => {
                return Err(EclError::configuration(
                    "rating scale has more than one write-off state",
                ))
            }
        }

        if positions(&states, StateKind::Cure).len() > 1 {
            return Err(EclError::configuration(
                "rating scale has more than one cure state",
            ));
        }

        Ok(Self {
            states,
            default_index,
        })
    }

    /// Creates a scale of performing grades followed by a default state.
    pub fn from_names(performing: &[&str], default: &str) -> EclResult<Self> {
        let mut states: Vec<RatingState> =
            performing.iter().map(|n| RatingState::performing(*n)).collect();
        states.push(RatingState::default_state(default));
        Self::new(states)
    }

    /// Number of states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always false for a constructed scale; provided for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The states in order.
    #[must_use]
    pub fn states(&self) -> &[RatingState] {
        &self.states
    }

    /// Returns the state at `index`.
    #[must_use]
    pub fn state(&self, index: usize) -> Option<&RatingState> {
        self.states.get(index)
    }

    /// Returns the position of the named state.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.states.iter().position(|s| s.name == name)
    }

    /// Returns the position of the named state or a configuration error.
    pub fn resolve(&self, name: &str) -> EclResult<usize> {
        self.index_of(name).ok_or_else(|| {
            EclError::configuration(format!("unknown rating state '{name}'"))
        })
    }

    /// Position of the default state.
    #[must_use]
    pub fn default_index(&self) -> usize {
        self.default_index
    }

    /// Position of the write-off state, if the scale has one.
    #[must_use]
    pub fn write_off_index(&self) -> Option<usize> {
        self.states
            .iter()
            .position(|s| s.kind == StateKind::WriteOff)
    }

    /// Position of the designated cure state, if the scale has one.
    #[must_use]
    pub fn cure_index(&self) -> Option<usize> {
        self.states.iter().position(|s| s.kind == StateKind::Cure)
    }

    /// Returns true if the scale contains a write-off state.
    #[must_use]
    pub fn has_write_off(&self) -> bool {
        self.write_off_index().is_some()
    }

    /// Returns true if the state at `index` can transition into default.
    #[must_use]
    pub fn is_performing(&self, index: usize) -> bool {
        self.states
            .get(index)
            .is_some_and(|s| s.kind.is_performing())
    }

    /// Indices of all performing (including cure) states.
    pub fn performing_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.kind.is_performing())
            .map(|(i, _)| i)
    }

    /// Returns a scale with a trailing write-off state.
    ///
    /// A scale that already has a write-off state is returned unchanged. Fails if a
    /// state is already named [`WRITE_OFF_STATE`].
    pub fn with_write_off(&self) -> EclResult<Self> {
        if self.has_write_off() {
            return Ok(self.clone());
        }
        let mut states = self.states.clone();
        states.push(RatingState::new(WRITE_OFF_STATE, StateKind::WriteOff));
        Self::new(states)
    }
}

fn positions(states: &[RatingState], kind: StateKind) -> Vec<usize> {
    states
        .iter()
        .enumerate()
        .filter(|(_, s)| s.kind == kind)
        .map(|(i, _)| i)
        .collect()
}

impl TryFrom<Vec<RatingState>> for RatingScale {
    type Error = EclError;

    fn try_from(states: Vec<RatingState>) -> EclResult<Self> {
        Self::new(states)
    }
}

impl From<RatingScale> for Vec<RatingState> {
    fn from(scale: RatingScale) -> Self {
        scale.states
    }
}
