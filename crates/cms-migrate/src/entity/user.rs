//! User row mapping.

use crate::destination::Document;
use crate::error::{MigrateError, Result};
use crate::matcher::LookupKey;
use crate::record::SourceRecord;

const MAX_LOGIN_LEN: usize = 60;

/// Users correlate by normalized email. A malformed email fails the record;
/// the run continues.
pub fn lookup_key(record: &SourceRecord) -> Result<LookupKey> {
    let email = normalized_email(record)?;
    Ok(LookupKey::NaturalKey(email))
}

pub fn transform(record: &SourceRecord) -> Result<Document> {
    let email = normalized_email(record)?;
    let display_name = display_name(record);

    // Passwords are not migrated; accounts get credentials out of band.
    Ok(Document::new()
        .with_field("email", email.as_str())
        .with_field("login", login(record))
        .with_field("display_name", display_name.as_str())
        .with_field("first_name", record.text("first_name").unwrap_or_default())
        .with_field("last_name", record.text("last_name").unwrap_or_default())
        .with_field("role", record.text("role").unwrap_or_default())
        .with_natural_key(email))
}

/// "first last" with whatever halves exist.
pub fn display_name(record: &SourceRecord) -> String {
    format!(
        "{} {}",
        record.text("first_name").unwrap_or_default(),
        record.text("last_name").unwrap_or_default()
    )
    .trim()
    .to_string()
}

fn normalized_email(record: &SourceRecord) -> Result<String> {
    let raw = record.text("email").unwrap_or_default();
    let email = raw.trim().to_lowercase();
    if validate_email(&email) {
        Ok(email)
    } else {
        Err(MigrateError::Validation(format!(
            "user {} ({}) will not be added due to invalid email",
            record.legacy_id(),
            display_name(record)
        )))
    }
}

/// Login from the source row, truncated to the destination limit; falls back
/// to a slug built from first/last name when the source login is empty.
fn login(record: &SourceRecord) -> String {
    let source_login = record.text("user_login").unwrap_or_default();
    if !source_login.is_empty() {
        return source_login.chars().take(MAX_LOGIN_LEN).collect();
    }

    let mut login = String::new();
    if let Some(first) = record.text("first_name") {
        login.push_str(&slug(first));
    }
    if let Some(last) = record.text("last_name") {
        if !login.is_empty() {
            login.push('-');
        }
        login.push_str(&slug(last));
    }
    login.chars().take(MAX_LOGIN_LEN).collect()
}

fn slug(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

/// Minimal structural email check: one `@`, non-empty local part, dotted
/// domain, no whitespace.
#[must_use]
pub fn validate_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let Some(domain) = parts.next() else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let mut labels = domain.split('.');
    domain.contains('.') && labels.all(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SqlValue;
    use serde_json::Value;

    fn user_row(email: &str) -> SourceRecord {
        SourceRecord::new(vec![
            ("id".into(), SqlValue::Int(5)),
            ("email".into(), SqlValue::Text(email.into())),
            ("first_name".into(), SqlValue::Text("Ann".into())),
            ("last_name".into(), SqlValue::Text("Smith".into())),
            ("user_login".into(), SqlValue::Text(String::new())),
            ("role".into(), SqlValue::Text("editor".into())),
        ])
        .unwrap()
    }

    #[test]
    fn valid_emails_pass() {
        for email in ["a@b.co", "first.last@sub.example.org", "x+tag@example.com"] {
            assert!(validate_email(email), "{email} should be valid");
        }
    }

    #[test]
    fn invalid_emails_fail() {
        for email in ["", "plain", "@example.com", "a@", "a@nodot", "a b@example.com", "a@.com", "a@com."] {
            assert!(!validate_email(email), "{email} should be invalid");
        }
    }

    #[test]
    fn email_is_normalized_for_matching() {
        let doc = transform(&user_row("  Ann.Smith@Example.COM ")).unwrap();
        assert_eq!(doc.natural_key.as_deref(), Some("ann.smith@example.com"));
    }

    #[test]
    fn invalid_email_is_a_record_level_failure() {
        let err = transform(&user_row("not-an-email")).unwrap_err();
        assert!(err.is_record_level());
        assert!(err.to_string().contains("invalid email"));
    }

    #[test]
    fn empty_login_falls_back_to_name_slug() {
        let doc = transform(&user_row("ann@example.com")).unwrap();
        assert_eq!(doc.fields["login"], Value::from("ann-smith"));
        assert_eq!(doc.fields["display_name"], Value::from("Ann Smith"));
    }

    #[test]
    fn long_login_is_truncated() {
        let mut fields = user_row("ann@example.com").fields().to_vec();
        for (name, value) in &mut fields {
            if name == "user_login" {
                *value = SqlValue::Text("x".repeat(100));
            }
        }
        let doc = transform(&SourceRecord::new(fields).unwrap()).unwrap();
        assert_eq!(doc.fields["login"].as_str().unwrap().len(), 60);
    }
}
