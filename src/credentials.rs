// Credentials file: two lines, `key=value`, username first, password second.

use crate::error::{CatalogError, Result};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Login payload for `POST /auth/login`.
#[derive(Serialize, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// Keep the password out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::LocalFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|reason| CatalogError::Credentials {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Only the line order matters; key names are ignored.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let mut lines = text.lines();
        let username = value_of(lines.next(), "username", 1)?;
        let password = value_of(lines.next(), "password", 2)?;
        Ok(Credentials { username, password })
    }
}

fn value_of(line: Option<&str>, what: &str, line_no: usize) -> std::result::Result<String, String> {
    let line = line.ok_or_else(|| format!("missing {what} on line {line_no}"))?;
    let (_, value) = line
        .trim_end()
        .split_once('=')
        .ok_or_else(|| format!("line {line_no} is not key=value"))?;
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_ordered_lines() {
        let creds = Credentials::parse("user=ingestor\npassword=s3cret\n").unwrap();
        assert_eq!(creds.username, "ingestor");
        assert_eq!(creds.password, "s3cret");
    }

    #[test]
    fn key_names_are_not_checked() {
        let creds = Credentials::parse("a=alice\r\nb=pw\r\n").unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "pw");
    }

    #[test]
    fn password_may_contain_equals() {
        let creds = Credentials::parse("user=bob\npassword=a=b==\n").unwrap();
        assert_eq!(creds.password, "a=b==");
    }

    #[test]
    fn missing_password_line_is_an_error() {
        let err = Credentials::parse("user=bob\n").unwrap_err();
        assert!(err.contains("password"), "unexpected reason: {err}");
    }

    #[test]
    fn line_without_separator_is_an_error() {
        let err = Credentials::parse("bob\npassword=x\n").unwrap_err();
        assert!(err.contains("line 1"), "unexpected reason: {err}");
    }

    #[test]
    fn debug_hides_password() {
        let creds = Credentials::parse("user=bob\npassword=hunter2\n").unwrap();
        assert!(!format!("{creds:?}").contains("hunter2"));
    }

    #[test]
    fn from_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Credentials::from_file(&dir.path().join(".secrets")).unwrap_err();
        assert!(matches!(err, CatalogError::LocalFile { .. }));
    }
}
