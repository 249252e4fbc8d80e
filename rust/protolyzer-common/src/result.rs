use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Fails with `InvalidIndex` unless `index < bound`.
#[macro_export]
macro_rules! verify_index {
    ($name:expr, $index:expr, $bound:expr) => {{
        let index: usize = $index;
        let bound: usize = $bound;
        if index >= bound {
            return $crate::result::invalid_index($name, index, bound);
        }
    }};
}

/// Fails with `SizeMismatch` unless `actual == expected`.
#[macro_export]
macro_rules! verify_size {
    ($name:expr, $expected:expr, $actual:expr) => {{
        let expected: usize = $expected;
        let actual: usize = $actual;
        if expected != actual {
            return $crate::result::size_mismatch($name, expected, actual);
        }
    }};
}

/// Fails with `InvalidState` unless the condition holds.
#[macro_export]
macro_rules! verify_state {
    ($name:expr, $expr:expr) => {{
        if !$expr {
            return $crate::result::invalid_state($name, stringify!($expr));
        }
    }};
}

#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

#[cold]
pub fn invalid_index<T>(name: &str, index: usize, bound: usize) -> Result<T> {
    Err(logged(Error::invalid_index(name, index, bound)))
}

#[cold]
pub fn size_mismatch<T>(name: &str, expected: usize, actual: usize) -> Result<T> {
    Err(logged(Error::size_mismatch(name, expected, actual)))
}

#[cold]
pub fn invalid_state<T>(name: &str, message: &str) -> Result<T> {
    Err(logged(Error::invalid_state(name, message)))
}

#[cold]
pub fn capacity_overflow<T>(name: &str, requested: usize, capacity: usize) -> Result<T> {
    Err(logged(Error::capacity_overflow(name, requested, capacity)))
}

#[cold]
pub fn invalid_arg<T>(name: &str, message: &str) -> Result<T> {
    Err(logged(Error::invalid_arg(name, message)))
}

#[cold]
pub fn invalid_format<T>(element: &str, message: &str) -> Result<T> {
    Err(logged(Error::invalid_format(element, message)))
}

fn logged(err: Error) -> Error {
    log::warn!("{err}");
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checked_get(values: &[u8], index: usize) -> Result<u8> {
        verify_index!("values", index, values.len());
        Ok(values[index])
    }

    fn checked_pair(a: &[u8], b: &[u8]) -> Result<usize> {
        verify_size!("pair", a.len(), b.len());
        verify_state!("pair", !a.is_empty());
        Ok(a.len())
    }

    #[test]
    fn test_verify_index() {
        assert_eq!(checked_get(&[1, 2, 3], 2).unwrap(), 3);
        assert!(checked_get(&[1, 2, 3], 3).unwrap_err().is_invalid_index());
    }

    #[test]
    fn test_verify_size_and_state() {
        assert_eq!(checked_pair(&[1, 2], &[3, 4]).unwrap(), 2);
        assert!(checked_pair(&[1], &[3, 4]).unwrap_err().is_size_mismatch());
        assert!(checked_pair(&[], &[]).unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_verify_arg() {
        assert!(verify_arg(true, "width", "width > 0").is_ok());
        let err = verify_arg(false, "width", "width > 0").unwrap_err();
        assert_eq!(err.to_string(), "invalid argument width: width > 0");
    }
}
