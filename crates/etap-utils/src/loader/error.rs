use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadingError {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    WalkDir(#[from] async_walkdir::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error(transparent)]
    Yaml(#[from] serde_yml::Error),
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl From<serde_yml::Error> for LoadingError {
    fn from(e: serde_yml::Error) -> Self {
        ParseError::Yaml(e).into()
    }
}

impl From<std::string::FromUtf8Error> for LoadingError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        ParseError::Utf8(e).into()
    }
}
