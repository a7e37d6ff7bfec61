use thiserror::Error;

use crate::{BackendKind, Name, Value};

pub type EchtResult<T> = Result<T, EchtError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EchtError {
    #[error("Value {value:?} is not stored under {name}. Nothing was removed.")]
    ValueNotPresent { name: Name, value: Value },
    #[error("The {backend} backend does not support `{operation}`")]
    Unsupported {
        backend: BackendKind,
        operation: &'static str,
    },
    #[error("Malformed name ({0})")]
    MalformedName(Box<str>),
    #[error("Unknown backend \"{0}\"")]
    UnknownBackend(Box<str>),
}
