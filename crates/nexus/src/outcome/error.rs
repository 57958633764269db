//! Coded error value shared by every fallible nexus operation

/// A small, domain-specific error code
///
/// Implementors are `#[repr(u8)]` enums. Code 0 is reserved for "no error" and
/// is never used by a variant; see [`Error::ok`].
pub trait ErrorCode: Copy + Sized + 'static {
    /// Name of the subsystem that owns the codes, e.g. `"window"`
    const DOMAIN: &'static str;

    /// Raw code value
    fn code(self) -> u8;

    /// Recover the typed code from a raw value
    fn from_code(code: u8) -> Option<Self>;

    /// Short human-readable description of the code
    fn describe(self) -> &'static str;
}

/// Declares a `#[repr(u8)]` error code enum and its [`ErrorCode`] impl
#[macro_export]
macro_rules! error_codes {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident in $domain:literal {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal => $text:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant = $value,
            )+
        }

        impl $crate::outcome::ErrorCode for $name {
            const DOMAIN: &'static str = $domain;

            fn code(self) -> u8 {
                self as u8
            }

            fn from_code(code: u8) -> Option<Self> {
                match code {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn describe(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::outcome::ErrorCode::describe(*self))
            }
        }
    };
}

/// Error carried by a failed [`Outcome`](super::Outcome)
///
/// Holds the owning domain, a raw code and an optional message. There are no
/// `From` conversions in or out of this type: callers match on
/// [`Error::code`] explicitly.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{domain} error {code}{}", message_suffix(.message))]
pub struct Error {
    domain: &'static str,
    code: u8,
    message: Option<String>,
}

fn message_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl Error {
    /// Create an error from a code, without a message
    pub fn new<C: ErrorCode>(code: C) -> Self {
        Self {
            domain: C::DOMAIN,
            code: code.code(),
            message: None,
        }
    }

    /// Create an error from a code with a human-readable message
    pub fn with_message<C: ErrorCode>(code: C, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            domain: C::DOMAIN,
            code: code.code(),
            message: (!message.is_empty()).then_some(message),
        }
    }

    /// The reserved "no error" value (code 0)
    pub const fn ok() -> Self {
        Self {
            domain: "",
            code: 0,
            message: None,
        }
    }

    /// Whether this is the reserved "no error" value
    pub const fn is_ok(&self) -> bool {
        self.code == 0
    }

    /// Raw code value
    pub const fn raw_code(&self) -> u8 {
        self.code
    }

    /// Domain of the code, empty for [`Error::ok`]
    pub const fn domain(&self) -> &'static str {
        self.domain
    }

    /// Typed code, if this error belongs to `C`'s domain
    pub fn code<C: ErrorCode>(&self) -> Option<C> {
        if self.domain == C::DOMAIN {
            C::from_code(self.code)
        } else {
            None
        }
    }

    /// Whether this error carries exactly the given code
    pub fn is<C: ErrorCode + PartialEq>(&self, code: C) -> bool {
        self.code::<C>() == Some(code)
    }

    /// Optional message
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Whether a message is present
    pub const fn has_message(&self) -> bool {
        self.message.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    error_codes! {
        enum SampleCode in "sample" {
            First = 1 => "first failure",
            Second = 2 => "second failure",
        }
    }

    error_codes! {
        enum OtherCode in "other" {
            First = 1 => "other failure",
        }
    }

    #[test]
    fn test_code_without_message() {
        let error = Error::new(SampleCode::Second);

        assert!(!error.is_ok());
        assert!(!error.has_message());
        assert_eq!(error.raw_code(), 2);
        assert_eq!(error.code::<SampleCode>(), Some(SampleCode::Second));
        assert_eq!(error.to_string(), "sample error 2");
    }

    #[test]
    fn test_code_with_message() {
        let error = Error::with_message(SampleCode::First, "boom");

        assert!(error.has_message());
        assert_eq!(error.message(), Some("boom"));
        assert_eq!(error.to_string(), "sample error 1: boom");
    }

    #[test]
    fn test_empty_message_is_no_message() {
        let error = Error::with_message(SampleCode::First, "");
        assert!(!error.has_message());
    }

    #[test]
    fn test_code_is_scoped_to_domain() {
        let error = Error::new(SampleCode::First);

        // Same raw value, different domain
        assert_eq!(error.code::<OtherCode>(), None);
        assert!(error.is(SampleCode::First));
        assert!(!error.is(OtherCode::First));
    }

    #[test]
    fn test_reserved_ok_code() {
        let error = Error::ok();
        assert!(error.is_ok());
        assert_eq!(error.raw_code(), 0);
        assert_eq!(error.code::<SampleCode>(), None);
    }

    #[test]
    fn test_describe_through_display() {
        assert_eq!(SampleCode::Second.to_string(), "second failure");
        assert_eq!(SampleCode::from_code(0), None);
    }
}
