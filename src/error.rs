/// Custom error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Xdg(#[from] xdg::BaseDirectoriesError),
    #[error(transparent)]
    Config(#[from] confy::ConfyError),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    BadMimeType(#[from] mime::FromStrError),
    #[error("parcel truncated: needed {needed} more byte(s), {remaining} left")]
    Truncated { needed: usize, remaining: usize },
    #[error("invalid length {0} in parcel")]
    BadLength(i32),
    #[error("{0} trailing byte(s) after message")]
    TrailingBytes(usize),
    #[error("string is not valid UTF-16")]
    BadString(#[from] std::string::FromUtf16Error),
    #[error("unexpected interface token '{0}'")]
    BadInterfaceToken(String),
    #[error("unknown transaction code {0}")]
    UnknownTransaction(u32),
    #[error("host replied with status {0}")]
    BadStatus(i32),
    #[error("could not parse package event '{0}'")]
    BadEvent(String),
    #[error("package registry manifest not found at {0}")]
    NoRegistry(std::path::PathBuf),
    #[error("package '{0}' has no icon")]
    NoIcon(String),
    #[error("frame of {0} bytes exceeds the transport limit")]
    FrameTooLarge(usize),
    #[error("length {0} does not fit in an int32")]
    TooLong(usize),
    #[cfg(test)]
    #[error(transparent)]
    FromUtf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
