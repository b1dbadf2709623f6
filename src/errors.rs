//! Kernel termination codes.
//!
//! Construction failures are never reported through this type; they live in
//! the validity flag of the object that failed. An [`Error`] only ever travels
//! to the halt primitive or out of the process as its exit status.

use core::fmt;

/// Why the kernel stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Error {
    /// Unexpected top-level fault, or a program run on an invalid kernel
    Undefined = 1,
    /// A fatal accessor was called before a valid kernel existed
    SyscallOnInvalidSingleton = 2,
    /// The calling context has no kernel thread
    ResourceNotFound = 3,
    /// Explicit shutdown request
    UserTermination = 4,
}

impl Error {
    /// Process exit status carried by this error.
    pub const fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Undefined => write!(f, "undefined error"),
            Error::SyscallOnInvalidSingleton => write!(f, "kernel called before a valid instance was published"),
            Error::ResourceNotFound => write!(f, "resource not found"),
            Error::UserTermination => write!(f, "terminated by user request"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(Error::Undefined.code(), 1);
        assert_eq!(Error::SyscallOnInvalidSingleton.code(), 2);
        assert_eq!(Error::ResourceNotFound.code(), 3);
        assert_eq!(Error::UserTermination.code(), 4);
    }
}
