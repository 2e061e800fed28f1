use derive_more::{Display, Error};

#[derive(Debug, Display, Error, PartialEq, Eq, Clone)]
pub enum ClientError {
    /// An element the page must embed is not there
    #[display("missing element #{_0}")]
    MissingConfig(#[error(not(source))] String),
    /// The element exists but its content is not a JSON string
    #[display("invalid value in #{element_id}: {reason}")]
    InvalidConfig { element_id: String, reason: String },
    #[display("card widget is already mounted")]
    AlreadyMounted,
    #[display("card widget is not mounted")]
    NotMounted,
    #[display("payment provider error: {_0}")]
    Provider(#[error(not(source))] String),
    #[display("request failed: {_0}")]
    Transport(#[error(not(source))] String),
    #[display("dom error: {_0}")]
    Dom(#[error(not(source))] String),
}
