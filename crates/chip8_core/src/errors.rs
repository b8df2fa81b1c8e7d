use core::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum ChipError {
    /// Program image larger than the free memory region.
    OutOfMemory(usize),
}

impl fmt::Display for ChipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChipError::OutOfMemory(size) => {
                write!(f, "program of {} bytes does not fit in free memory", size)
            }
        }
    }
}

impl core::error::Error for ChipError {}
