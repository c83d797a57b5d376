use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Failure kinds surfaced by preprocessing, fitting, persistence and metrics.
#[derive(Debug)]
pub enum ClassifierError {
    /// A file, directory or model artifact does not exist.
    NotFound(PathBuf),
    /// Malformed image, bad target size, or values outside the expected range.
    InvalidInput(String),
    /// Two paired arrays disagree in shape.
    ShapeMismatch { expected: String, found: String },
    /// A model artifact could not be parsed into valid parameters.
    CorruptArtifact(String),
    /// Inference was attempted before the model was fitted or restored.
    NotFitted,
    Io(io::Error),
}

pub type Result<T> = std::result::Result<T, ClassifierError>;

impl ClassifierError {
    pub(crate) fn shape_mismatch(expected: impl fmt::Debug, found: impl fmt::Debug) -> Self {
        ClassifierError::ShapeMismatch {
            expected: format!("{:?}", expected),
            found: format!("{:?}", found),
        }
    }

    /// Map an I/O error on `path`, keeping "missing" distinct from other failures.
    pub(crate) fn from_io(err: io::Error, path: impl Into<PathBuf>) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ClassifierError::NotFound(path.into()),
            _ => ClassifierError::Io(err),
        }
    }
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClassifierError::NotFound(path) => write!(f, "Not found: {}", path.display()),
            ClassifierError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ClassifierError::ShapeMismatch { expected, found } => {
                write!(f, "Shape mismatch: expected {}, found {}", expected, found)
            }
            ClassifierError::CorruptArtifact(msg) => write!(f, "Corrupt model artifact: {}", msg),
            ClassifierError::NotFitted => {
                write!(f, "Model is not fitted; call fit or load a saved model first")
            }
            ClassifierError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl Error for ClassifierError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ClassifierError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ClassifierError {
    fn from(err: io::Error) -> Self {
        ClassifierError::Io(err)
    }
}
