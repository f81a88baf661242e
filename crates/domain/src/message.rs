//! Message assembly from variadic parts.

use std::fmt::{Display, Write as _};

/// Concatenate every part with no separator.
#[must_use]
pub fn concat_message(parts: &[&dyn Display]) -> String {
    let mut message = String::new();
    for part in parts {
        let _ = write!(message, "{part}");
    }
    message
}

/// Build a message from any number of `Display` parts, concatenated with no
/// separator.
///
/// ```
/// let user = "ada";
/// assert_eq!(fanlog_domain::msg!("user ", user, " logged in ", 3, "x"), "user ada logged in 3x");
/// ```
#[macro_export]
macro_rules! msg {
    () => {
        ::std::string::String::new()
    };
    ($($part:expr),+ $(,)?) => {
        $crate::message::concat_message(&[$(&$part as &dyn ::std::fmt::Display),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_are_joined_without_separator() {
        assert_eq!(concat_message(&[&"a", &1, &"b", &2.5]), "a1b2.5");
        assert_eq!(concat_message(&[]), "");
    }

    #[test]
    fn macro_accepts_mixed_parts() {
        let count = 2;
        assert_eq!(crate::msg!("files: ", count), "files: 2");
        assert_eq!(crate::msg!(), "");
    }
}
