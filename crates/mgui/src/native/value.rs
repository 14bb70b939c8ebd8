//! Dynamically typed values crossing the native callback boundary.
//!
//! Native signals deliver their arguments as a slice of [`NativeValue`]s.
//! [`FromNativeArgs`] turns that slice into a typed tuple for a slot method,
//! and [`IntoNative`] turns the method's return value back.

use std::fmt;

use crate::error::{BoxError, NativeError};
use crate::native::source::NativeHandle;

/// A value passed to or returned from a native callback.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NativeValue {
    /// No value (`void`).
    #[default]
    None,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Double(f64),
    Str(String),
    /// A reference to another native object.
    Object(NativeHandle),
}

impl NativeValue {
    /// Name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            NativeValue::None => "none",
            NativeValue::Bool(_) => "bool",
            NativeValue::Int(_) => "int",
            NativeValue::UInt(_) => "uint",
            NativeValue::Double(_) => "double",
            NativeValue::Str(_) => "string",
            NativeValue::Object(_) => "object",
        }
    }
}

impl fmt::Display for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeValue::None => f.write_str("none"),
            NativeValue::Bool(v) => write!(f, "{v}"),
            NativeValue::Int(v) => write!(f, "{v}"),
            NativeValue::UInt(v) => write!(f, "{v}"),
            NativeValue::Double(v) => write!(f, "{v}"),
            NativeValue::Str(v) => write!(f, "{v:?}"),
            NativeValue::Object(h) => write!(f, "{h:?}"),
        }
    }
}

// ============================================================================
// Rust -> native
// ============================================================================

/// Conversion of a slot's return value into a native value.
pub trait IntoNative {
    fn into_native(self) -> NativeValue;
}

impl IntoNative for () {
    fn into_native(self) -> NativeValue {
        NativeValue::None
    }
}

impl IntoNative for bool {
    fn into_native(self) -> NativeValue {
        NativeValue::Bool(self)
    }
}

impl IntoNative for i32 {
    fn into_native(self) -> NativeValue {
        NativeValue::Int(self.into())
    }
}

impl IntoNative for i64 {
    fn into_native(self) -> NativeValue {
        NativeValue::Int(self)
    }
}

impl IntoNative for u32 {
    fn into_native(self) -> NativeValue {
        NativeValue::UInt(self.into())
    }
}

impl IntoNative for u64 {
    fn into_native(self) -> NativeValue {
        NativeValue::UInt(self)
    }
}

impl IntoNative for f64 {
    fn into_native(self) -> NativeValue {
        NativeValue::Double(self)
    }
}

impl IntoNative for String {
    fn into_native(self) -> NativeValue {
        NativeValue::Str(self)
    }
}

impl IntoNative for NativeHandle {
    fn into_native(self) -> NativeValue {
        NativeValue::Object(self)
    }
}

impl IntoNative for NativeValue {
    fn into_native(self) -> NativeValue {
        self
    }
}

// ============================================================================
// native -> Rust
// ============================================================================

/// Conversion of one native argument into a Rust value.
pub trait FromNative: Sized {
    /// Type name used in mismatch errors.
    const TYPE_NAME: &'static str;

    fn from_native(value: &NativeValue) -> Option<Self>;
}

macro_rules! from_native {
    ($ty:ty, $name:literal, $($pat:pat => $out:expr),+ $(,)?) => {
        impl FromNative for $ty {
            const TYPE_NAME: &'static str = $name;

            fn from_native(value: &NativeValue) -> Option<Self> {
                match value {
                    $($pat => $out,)+
                    _ => None,
                }
            }
        }
    };
}

from_native!(bool, "bool", NativeValue::Bool(v) => Some(*v));
from_native!(i32, "int",
    NativeValue::Int(v) => i32::try_from(*v).ok(),
    NativeValue::UInt(v) => i32::try_from(*v).ok(),
);
from_native!(i64, "int",
    NativeValue::Int(v) => Some(*v),
    NativeValue::UInt(v) => i64::try_from(*v).ok(),
);
from_native!(u32, "uint",
    NativeValue::UInt(v) => u32::try_from(*v).ok(),
    NativeValue::Int(v) => u32::try_from(*v).ok(),
);
from_native!(u64, "uint",
    NativeValue::UInt(v) => Some(*v),
    NativeValue::Int(v) => u64::try_from(*v).ok(),
);
from_native!(f64, "double",
    NativeValue::Double(v) => Some(*v),
    NativeValue::Int(v) => Some(*v as f64),
);
from_native!(String, "string", NativeValue::Str(v) => Some(v.clone()));
from_native!(NativeHandle, "object", NativeValue::Object(h) => Some(*h));

impl FromNative for NativeValue {
    const TYPE_NAME: &'static str = "any";

    fn from_native(value: &NativeValue) -> Option<Self> {
        Some(value.clone())
    }
}

/// Conversion of a whole native argument list into a typed tuple.
pub trait FromNativeArgs: Sized {
    /// Number of arguments expected.
    const ARITY: usize;

    fn from_native_args(args: &[NativeValue]) -> Result<Self, NativeError>;
}

fn arg<T: FromNative>(args: &[NativeValue], index: usize) -> Result<T, NativeError> {
    let value = &args[index];
    T::from_native(value).ok_or(NativeError::ArgumentType {
        index,
        expected: T::TYPE_NAME,
        got: value.type_name(),
    })
}

fn check_arity(args: &[NativeValue], expected: usize) -> Result<(), NativeError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(NativeError::ArgumentCount {
            expected,
            got: args.len(),
        })
    }
}

impl FromNativeArgs for () {
    const ARITY: usize = 0;

    fn from_native_args(args: &[NativeValue]) -> Result<Self, NativeError> {
        check_arity(args, 0)
    }
}

macro_rules! from_native_args {
    ($n:literal; $($t:ident => $i:tt),+) => {
        impl<$($t: FromNative),+> FromNativeArgs for ($($t,)+) {
            const ARITY: usize = $n;

            fn from_native_args(args: &[NativeValue]) -> Result<Self, NativeError> {
                check_arity(args, $n)?;
                Ok(($(arg::<$t>(args, $i)?,)+))
            }
        }
    };
}

from_native_args!(1; A => 0);
from_native_args!(2; A => 0, B => 1);
from_native_args!(3; A => 0, B => 1, C => 2);
from_native_args!(4; A => 0, B => 1, C => 2, D => 3);

// ============================================================================
// Handler outcomes
// ============================================================================

/// What a slot method or command method may return.
///
/// Plain values are converted to a native value; an `Err` is treated as a
/// handler failure and reported instead of being returned to native code.
pub trait HandlerOutcome {
    fn into_outcome(self) -> Result<NativeValue, BoxError>;
}

macro_rules! plain_outcome {
    ($($ty:ty),+) => {
        $(impl HandlerOutcome for $ty {
            fn into_outcome(self) -> Result<NativeValue, BoxError> {
                Ok(self.into_native())
            }
        })+
    };
}

plain_outcome!((), bool, i32, i64, u32, u64, f64, String, NativeHandle, NativeValue);

impl<T, E> HandlerOutcome for Result<T, E>
where
    T: IntoNative,
    E: std::error::Error + 'static,
{
    fn into_outcome(self) -> Result<NativeValue, BoxError> {
        self.map(IntoNative::into_native)
            .map_err(|e| Box::new(e) as BoxError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_conversion() {
        let args = [NativeValue::Int(3), NativeValue::Str("x".into())];
        let (n, s) = <(i32, String)>::from_native_args(&args).unwrap();
        assert_eq!((n, s.as_str()), (3, "x"));
    }

    #[test]
    fn test_conversion_errors() {
        let args = [NativeValue::Bool(true)];
        assert_eq!(
            <(i32,)>::from_native_args(&args),
            Err(NativeError::ArgumentType {
                index: 0,
                expected: "int",
                got: "bool"
            })
        );
        assert_eq!(
            <()>::from_native_args(&args),
            Err(NativeError::ArgumentCount { expected: 0, got: 1 })
        );
        assert_eq!(i32::from_native(&NativeValue::Int(i64::MAX)), None);
    }

    #[test]
    fn test_outcomes() {
        assert_eq!(true.into_outcome().unwrap(), NativeValue::Bool(true));
        let failed: Result<(), NativeError> = Err(NativeError::NotConnected);
        assert_eq!(
            failed.into_outcome().unwrap_err().to_string(),
            "slot is not connected"
        );
    }
}
