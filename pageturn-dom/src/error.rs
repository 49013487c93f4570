use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomError {
    #[error("wrapper element not found in the live document")]
    WrapperNotFound,

    #[error("no usable container in the live document")]
    ContainerNotFound,

    #[error("malformed document: {0}")]
    MalformedDocument(String),
}

pub type Result<T> = std::result::Result<T, DomError>;
