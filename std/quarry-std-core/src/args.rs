//!
//! Argument Accessors
//!
//! Helpers used by module dispatch tables to pull typed arguments out of the
//! positional argument list. Arity and type mismatches are reported as
//! `INVALID-ARGUMENT` in the core namespace.
//!

use crate::error::ModuleError;
use crate::value::Item;

/// Require exactly `min..=max` arguments
pub fn check_arity(function: &str, args: &[Item], min: usize, max: usize) -> Result<(), ModuleError> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{} to {}", min, max)
        };
        return Err(ModuleError::invalid_argument(
            function,
            format!("expected {} arguments, got {}", expected, args.len()),
        ));
    }
    Ok(())
}

pub fn item_arg<'a>(function: &str, args: &'a [Item], index: usize) -> Result<&'a Item, ModuleError> {
    args.get(index).ok_or_else(|| {
        ModuleError::invalid_argument(function, format!("missing argument {}", index + 1))
    })
}

pub fn optional_arg(args: &[Item], index: usize) -> Option<&Item> {
    match args.get(index) {
        Some(Item::Null) | None => None,
        Some(item) => Some(item),
    }
}

pub fn string_arg<'a>(function: &str, args: &'a [Item], index: usize) -> Result<&'a str, ModuleError> {
    let item = item_arg(function, args, index)?;
    item.as_str().ok_or_else(|| {
        ModuleError::invalid_argument(
            function,
            format!("argument {} must be a string, got {}", index + 1, item.kind()),
        )
    })
}

/// Integer argument; a string holding a decimal integer is accepted too.
pub fn integer_arg(function: &str, args: &[Item], index: usize) -> Result<i64, ModuleError> {
    let item = item_arg(function, args, index)?;
    match item {
        Item::Integer(i) => Ok(*i),
        Item::String(s) => s.trim().parse::<i64>().map_err(|_| {
            ModuleError::invalid_argument(
                function,
                format!("argument {} is not an integer: '{}'", index + 1, s),
            )
        }),
        other => Err(ModuleError::invalid_argument(
            function,
            format!("argument {} must be an integer, got {}", index + 1, other.kind()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CODE_INVALID_ARGUMENT;

    #[test]
    fn test_arity() {
        let args = vec![Item::from("a")];
        assert!(check_arity("f", &args, 1, 2).is_ok());
        let err = check_arity("f", &args, 2, 2).unwrap_err();
        assert_eq!(err.code, CODE_INVALID_ARGUMENT);
        assert!(err.message.contains("expected 2 arguments, got 1"));
    }

    #[test]
    fn test_string_arg() {
        let args = vec![Item::from("token"), Item::Integer(1)];
        assert_eq!(string_arg("f", &args, 0).unwrap(), "token");
        assert!(string_arg("f", &args, 1).is_err());
        assert!(string_arg("f", &args, 2).is_err());
    }

    #[test]
    fn test_integer_arg_accepts_numeric_strings() {
        let args = vec![Item::Integer(3), Item::from(" 7 "), Item::from("x"), Item::Boolean(true)];
        assert_eq!(integer_arg("f", &args, 0).unwrap(), 3);
        assert_eq!(integer_arg("f", &args, 1).unwrap(), 7);
        assert!(integer_arg("f", &args, 2).is_err());
        assert!(integer_arg("f", &args, 3).is_err());
    }

    #[test]
    fn test_optional_arg_treats_null_as_absent() {
        let args = vec![Item::from("a"), Item::Null];
        assert!(optional_arg(&args, 1).is_none());
        assert!(optional_arg(&args, 5).is_none());
        assert!(optional_arg(&args, 0).is_some());
    }
}
