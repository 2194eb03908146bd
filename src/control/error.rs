use thiserror::Error;

/// Reasons an inbound control message cannot be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("control message is not a JSON object")]
    NotAnObject,
    #[error("control message has no \"command\" string")]
    MissingCommand,
    #[error("control message \"destination\" is not a string")]
    InvalidDestination,
}
