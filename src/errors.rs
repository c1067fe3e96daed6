//
// Errors
//
use std::io;
use std::result;
use std::error;
use std::num;
use std::fmt;
use regex;

/// Type alias for phrasemill errors
pub type Result<X> = result::Result<X, Error>;

/// Wrapper for many kinds of errors occuring while counting and scoring
#[derive(Debug)]
pub enum Error {
    InvalidDelta(f64),
    IncompatibleCounters(String),
    MissingUnigram(String),
    RegexError(regex::Error),
    IOError(io::Error),
    ParseFloatError(num::ParseFloatError),
    MissingFile(&'static str, Option<io::Error>),
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::InvalidDelta(delta) => {
                write!(f, "Invalid error bound: delta must be strictly between 0 and 1, got {}", delta)
            }
            Error::IncompatibleCounters(ref info) => write!(f, "Can't merge counters: {}", info),
            Error::MissingUnigram(ref token) => {
                write!(f,
                    "The bigram token {:?} was never counted as a unigram. \
                    Both counters must be fed the same stream in the same order.",
                    token)
            }
            Error::RegexError(ref err) => write!(f, "Bad pattern: {}", err),
            Error::IOError(ref err) => write!(f, "IO error: {}", err),
            Error::ParseFloatError(ref err) => write!(f, "Error parsing float: {}", err),
            Error::MissingFile(ref info, ref opt_err) => {
                write!(f,
                    "The {} must already exist at this point but there was a problem opening it. \
                    Wrong directory? Maybe missed a step? The OS error was: ",
                    info)?;
                if let &Some(ref err) = opt_err { write!(f, "{}", err) }
                else { write!(f, "Unknown") }
            },
            Error::Other(ref info) => write!(f, "{}", info),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::InvalidDelta(_) => None,
            Error::IncompatibleCounters(_) => None,
            Error::MissingUnigram(_) => None,
            Error::RegexError(ref err) => Some(err),
            Error::IOError(ref err) => Some(err),
            Error::ParseFloatError(ref err) => Some(err),
            Error::MissingFile(_, Some(ref err)) => Some(err),
            Error::MissingFile(_, None) => None,
            Error::Other(_) => None,
        }
    }
}
//
// Convert everything else into Error
//
impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::RegexError(err)
    }
}
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::IOError(err)
    }
}
impl From<num::ParseFloatError> for Error {
    fn from(err: num::ParseFloatError) -> Self {
        Error::ParseFloatError(err)
    }
}

//
// Convert Error into a general io Error
//
impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        io::Error::new(io::ErrorKind::Other, err)
    }
}
