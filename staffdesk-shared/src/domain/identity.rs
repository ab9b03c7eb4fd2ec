/// Identity value objects: email, person name, job title
///
/// All three normalize their input (trim, and lowercase for email) on
/// construction, so two values built from differently formatted input
/// compare equal.

use serde::Serialize;
use std::fmt;
use validator::ValidateEmail;

use super::DomainError;

/// Maximum stored email length
pub const EMAIL_MAX_LEN: usize = 180;

/// Maximum length of a first or last name
pub const NAME_MAX_LEN: usize = 100;

/// Maximum length of a job title
pub const POSITION_MAX_LEN: usize = 100;

/// Validated, lowercased email address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn new(value: &str) -> Result<Self, DomainError> {
        let normalized = value.trim().to_lowercase();
        if normalized.is_empty()
            || normalized.len() > EMAIL_MAX_LEN
            || !normalized.validate_email()
        {
            return Err(DomainError::InvalidEmail(value.to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part after the `@`
    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map(|(_, d)| d).unwrap_or_default()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn bounded(value: &str, max: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.chars().count() > max {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// First and last name of a person
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullName {
    first: String,
    last: String,
}

impl FullName {
    pub fn new(first: &str, last: &str) -> Result<Self, DomainError> {
        let first = bounded(first, NAME_MAX_LEN).ok_or_else(|| {
            DomainError::InvalidName(format!(
                "first name must be 1-{} characters",
                NAME_MAX_LEN
            ))
        })?;
        let last = bounded(last, NAME_MAX_LEN).ok_or_else(|| {
            DomainError::InvalidName(format!(
                "last name must be 1-{} characters",
                NAME_MAX_LEN
            ))
        })?;
        Ok(Self { first, last })
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn last(&self) -> &str {
        &self.last
    }

    /// "First Last"
    pub fn full(&self) -> String {
        format!("{} {}", self.first, self.last)
    }

    /// Initials, e.g. "JD"
    pub fn initials(&self) -> String {
        self.first
            .chars()
            .take(1)
            .chain(self.last.chars().take(1))
            .flat_map(char::to_uppercase)
            .collect()
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first, self.last)
    }
}

/// Job title
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Position(String);

impl Position {
    pub fn new(title: &str) -> Result<Self, DomainError> {
        bounded(title, POSITION_MAX_LEN).map(Self).ok_or_else(|| {
            DomainError::InvalidPosition(format!(
                "title must be 1-{} characters",
                POSITION_MAX_LEN
            ))
        })
    }

    pub fn title(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_normalized() {
        let email = Email::new("  Jane.Doe@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "jane.doe@example.com");
        assert_eq!(email.domain(), "example.com");
        assert_eq!(email, Email::new("jane.doe@example.com").unwrap());
    }

    #[test]
    fn test_email_rejects_garbage() {
        assert!(Email::new("").is_err());
        assert!(Email::new("not-an-email").is_err());
        assert!(Email::new("a@").is_err());

        let long = format!("{}@example.com", "a".repeat(EMAIL_MAX_LEN));
        assert!(matches!(Email::new(&long), Err(DomainError::InvalidEmail(_))));
    }

    #[test]
    fn test_full_name() {
        let name = FullName::new(" jane ", "Doe").unwrap();
        assert_eq!(name.first(), "jane");
        assert_eq!(name.full(), "jane Doe");
        assert_eq!(name.initials(), "JD");
        assert!(FullName::new("", "Doe").is_err());
        assert!(FullName::new("Jane", "   ").is_err());
        assert!(FullName::new(&"x".repeat(NAME_MAX_LEN + 1), "Doe").is_err());
    }

    #[test]
    fn test_position() {
        assert_eq!(Position::new(" Engineer ").unwrap().title(), "Engineer");
        assert!(matches!(
            Position::new(""),
            Err(DomainError::InvalidPosition(_))
        ));
    }
}
