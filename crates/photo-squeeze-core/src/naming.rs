//! Storage filenames derived from free-text person names.

use thiserror::Error;

/// Extension appended to every stored photo.
pub const PHOTO_EXTENSION: &str = "jpg";

/// Errors from building a storage filename.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NamingError {
    /// Nothing usable was left after sanitizing.
    #[error("Name {0:?} contains no usable characters")]
    Empty(String),
}

/// Reduce a free-text name to `[A-Za-z0-9_-]`.
///
/// Spaces become underscores first; every other character outside the
/// allowed set is dropped.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Storage filename for a person's photo: the sanitized name plus `.jpg`.
///
/// Surrounding spaces are not trimmed; like any other space they become
/// underscores.
pub fn photo_filename(name: &str) -> Result<String, NamingError> {
    let stem = sanitize_filename(name);
    if stem.is_empty() {
        return Err(NamingError::Empty(name.to_string()));
    }
    Ok(format!("{stem}.{PHOTO_EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_spaces_become_underscores() {
        assert_eq!(sanitize_filename("Ram Bahadur Thapa"), "Ram_Bahadur_Thapa");
    }

    #[test]
    fn test_sanitize_drops_special_characters() {
        assert_eq!(sanitize_filename("O'Brien, Jr. (2)"), "OBrien_Jr_2");
        assert_eq!(sanitize_filename("a/b\\c.d"), "abcd");
        assert_eq!(sanitize_filename("keep-dash_and_underscore"), "keep-dash_and_underscore");
    }

    #[test]
    fn test_sanitize_drops_non_ascii() {
        assert_eq!(sanitize_filename("José राम"), "Jos_");
    }

    #[test]
    fn test_photo_filename() {
        assert_eq!(photo_filename("John Doe").unwrap(), "John_Doe.jpg");
    }

    #[test]
    fn test_photo_filename_keeps_surrounding_spaces() {
        assert_eq!(photo_filename(" John").unwrap(), "_John.jpg");
        assert_eq!(photo_filename("John Doe ").unwrap(), "John_Doe_.jpg");
        assert_eq!(photo_filename("   ").unwrap(), "___.jpg");
    }

    #[test]
    fn test_photo_filename_empty() {
        assert_eq!(
            photo_filename("!!!"),
            Err(NamingError::Empty("!!!".to_string()))
        );
        assert!(photo_filename("").is_err());
        assert!(photo_filename("राम").is_err());
    }
}
