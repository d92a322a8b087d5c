use std::fmt;

use crate::info::SublayerId;

#[derive(Debug)]
pub enum SublayerError {
    Parse(serde_json::Error),
    DuplicateId(SublayerId),
    TooDeep { depth: usize, max: usize },
}

impl fmt::Display for SublayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SublayerError::Parse(err) => write!(f, "sublayer metadata parse error: {err}"),
            SublayerError::DuplicateId(id) => write!(f, "duplicate sublayer id: {id}"),
            SublayerError::TooDeep { depth, max } => {
                write!(f, "sublayer nesting too deep: {depth} levels (max {max})")
            }
        }
    }
}

impl std::error::Error for SublayerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SublayerError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SublayerError {
    fn from(err: serde_json::Error) -> Self {
        SublayerError::Parse(err)
    }
}
