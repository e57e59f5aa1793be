use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("token has invalid format, should be num:<number> or label:<text>")]
    InvalidToken,
}
