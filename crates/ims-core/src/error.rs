use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    SizeMismatch { expected: usize, actual: usize },
    SizeOverflow,
    InvalidGeometry,
    SingularTransform,
    RegionOutsideImage,
    Allocation { requested: usize },
    Dispatch(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
            Self::SizeOverflow => write!(f, "pixel count overflows usize"),
            Self::InvalidGeometry => {
                write!(f, "invalid geometry: spacing must be positive and direction invertible")
            }
            Self::SingularTransform => write!(f, "transform is not invertible"),
            Self::RegionOutsideImage => write!(f, "region is not inside the image"),
            Self::Allocation { requested } => {
                write!(f, "failed to allocate output buffer for {requested} samples")
            }
            Self::Dispatch(reason) => write!(f, "worker dispatch failed: {reason}"),
        }
    }
}

impl std::error::Error for Error {}
