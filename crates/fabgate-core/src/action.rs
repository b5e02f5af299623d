//! transaction action selected on the command line

use crate::error::GatewayError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// endorse, order and commit a state change
    Submit,
    /// read-only query against current state
    Evaluate,
}

impl FromStr for Action {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let action = s.to_lowercase();
        match action.as_str() {
            "submit" => Ok(Action::Submit),
            "evaluate" => Ok(Action::Evaluate),
            _ => Err(GatewayError::InvalidAction(action)),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Submit => write!(f, "submit"),
            Action::Evaluate => write!(f, "evaluate"),
        }
    }
}
