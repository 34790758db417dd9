// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Typed command parameters.
//!
//! Every type a command handler can take as a positional argument implements
//! [`Param`]: it knows how to parse itself from a token and which tag to show
//! in help output.

use std::str::FromStr;

/// Help tag shown for freeform commands taking the remaining tokens.
pub const LIST_OF_STRINGS_TAG: &str = "<list of strings>";

/// A value that can be bound from a single command line token.
pub trait Param: FromStr + 'static {
    /// Tag shown in help output (e.g. `<int>`).
    fn type_tag() -> &'static str;
}

macro_rules! impl_param {
    ($($ty:ty => $tag:expr),* $(,)?) => {
        $(
            impl Param for $ty {
                fn type_tag() -> &'static str {
                    $tag
                }
            }
        )*
    };
}

impl_param! {
    i8 => "<signed char>",
    u8 => "<unsigned char>",
    i16 => "<short>",
    u16 => "<unsigned short>",
    i32 => "<int>",
    u32 => "<unsigned int>",
    i64 => "<long>",
    u64 => "<unsigned long>",
    i128 => "<long long>",
    u128 => "<unsigned long long>",
    isize => "<long>",
    usize => "<unsigned long>",
    f32 => "<float>",
    f64 => "<double>",
    bool => "<bool>",
    char => "<char>",
    String => "<string>",
}

/// Convert one token to its target type.
///
/// Returns `None` when the token does not parse, which callers treat as
/// "this command signature does not match the line".
pub fn select<T: Param>(token: &str) -> Option<T> {
    token.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_numbers() {
        assert_eq!(select::<i32>("-42"), Some(-42));
        assert_eq!(select::<u8>("255"), Some(255));
        assert_eq!(select::<u8>("256"), None);
        assert_eq!(select::<u32>("-1"), None);
        assert_eq!(select::<f64>("2.5"), Some(2.5));
        assert_eq!(select::<i32>("abc"), None);
    }

    #[test]
    fn test_select_bool_and_char() {
        assert_eq!(select::<bool>("true"), Some(true));
        assert_eq!(select::<bool>("false"), Some(false));
        assert_eq!(select::<bool>("yes"), None);
        assert_eq!(select::<char>("x"), Some('x'));
        assert_eq!(select::<char>("xy"), None);
    }

    #[test]
    fn test_select_string_never_fails() {
        assert_eq!(select::<String>(""), Some(String::new()));
        assert_eq!(select::<String>("any thing"), Some("any thing".to_string()));
    }

    #[test]
    fn test_type_tags() {
        assert_eq!(i32::type_tag(), "<int>");
        assert_eq!(String::type_tag(), "<string>");
        assert_eq!(f64::type_tag(), "<double>");
        assert_eq!(bool::type_tag(), "<bool>");
    }
}
