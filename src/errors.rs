use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum SimulatorError {
    // Trace parsing errors
    EmptyTraceLine,
    UnknownAccessTag(char),
    MissingAddress,
    InvalidAddress(String),

    // System errors
    IoError(std::io::Error),
}

impl fmt::Display for SimulatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulatorError::EmptyTraceLine => write!(f, "Empty trace line"),
            SimulatorError::UnknownAccessTag(tag) => {
                write!(f, "Unknown access tag: '{}'", tag)
            },
            SimulatorError::MissingAddress => {
                write!(f, "Trace line is missing an address field")
            },
            SimulatorError::InvalidAddress(text) => {
                write!(f, "Invalid hexadecimal address: \"{}\"", text)
            },
            SimulatorError::IoError(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl Error for SimulatorError {}

impl From<std::io::Error> for SimulatorError {
    fn from(error: std::io::Error) -> Self {
        SimulatorError::IoError(error)
    }
}
