//! Result type for fallible operations
//!
//! Every factory and subsystem init in nexus returns an [`Outcome`]: either the
//! produced value or a coded [`Error`]. Codes are per-subsystem `#[repr(u8)]`
//! enums implementing [`ErrorCode`], so callers can branch on them:
//!
//! ```
//! use nexus::outcome::{Error, Outcome};
//! use nexus::sys::LoggerErrorCode;
//!
//! fn report(result: Outcome<()>) -> &'static str {
//!     match result {
//!         Ok(()) => "ok",
//!         Err(error) => match error.code::<LoggerErrorCode>() {
//!             Some(LoggerErrorCode::AlreadyInitialized) => "already initialized",
//!             _ => "other",
//!         },
//!     }
//! }
//!
//! assert_eq!(report(Err(Error::new(LoggerErrorCode::AlreadyInitialized))), "already initialized");
//! ```

mod error;

pub use error::{Error, ErrorCode};

/// Either a value of type `T` or an [`Error`]
pub type Outcome<T, E = Error> = std::result::Result<T, E>;
