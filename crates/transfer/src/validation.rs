use std::path::{Component, Path};

use crate::TransferError;

/// Validates an attachment file name before it is put into a
/// `Content-Disposition` header.
///
/// Rejects:
/// - Empty names
/// - Anything but a single plain path component (`a/b`, `..`, `/x`, `C:`)
/// - Backslashes, double quotes and control characters
pub fn validate_file_name(name: &str) -> Result<(), TransferError> {
    if name.is_empty() {
        return Err(TransferError::InvalidFileName("empty name".into()));
    }

    if let Some(c) = name
        .chars()
        .find(|c| c.is_control() || *c == '"' || *c == '\\')
    {
        return Err(TransferError::InvalidFileName(format!(
            "character {c:?} not allowed: {name}"
        )));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        (Some(Component::ParentDir), _) => Err(TransferError::InvalidFileName(format!(
            "parent directory reference not allowed: {name}"
        ))),
        (Some(Component::RootDir | Component::Prefix(_)), _) => Err(
            TransferError::InvalidFileName(format!("absolute path not allowed: {name}")),
        ),
        _ => Err(TransferError::InvalidFileName(format!(
            "name must not contain a directory: {name}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_name() {
        assert!(validate_file_name("").is_err());
    }

    #[test]
    fn rejects_parent_dir() {
        assert!(validate_file_name("..").is_err());
        assert!(validate_file_name("../image.jpg").is_err());
    }

    #[test]
    fn rejects_absolute_path() {
        assert!(validate_file_name("/tmp/image.jpg").is_err());
    }

    #[test]
    fn rejects_directories() {
        assert!(validate_file_name("sub/image.jpg").is_err());
        assert!(validate_file_name("./image.jpg").is_err());
    }

    #[test]
    fn rejects_header_breaking_characters() {
        assert!(validate_file_name("a\"b.jpg").is_err());
        assert!(validate_file_name("a\\b.jpg").is_err());
        assert!(validate_file_name("a\r\nX-Evil: 1").is_err());
    }

    #[test]
    fn accepts_plain_names() {
        assert!(validate_file_name("image.jpg").is_ok());
        assert!(validate_file_name(".hidden").is_ok());
        assert!(validate_file_name("log 2024-01-01.csv").is_ok());
    }
}
