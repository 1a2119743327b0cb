use crate::DomainError;

/// Name fields must be between 2 and 255 characters.
pub(crate) fn name(field: &str, value: &str) -> Result<(), DomainError> {
    let len = value.chars().count();
    if !(2..=255).contains(&len) {
        return Err(DomainError::InvalidCommand(format!(
            "{field} must be between 2 and 255 characters"
        )));
    }
    Ok(())
}

/// Minimal shape check: one `@` with a non-empty local part and a domain
/// containing a dot.
pub(crate) fn email(value: &str) -> Result<(), DomainError> {
    let invalid = || DomainError::InvalidCommand(format!("{value:?} is not a valid email address"));

    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.is_empty() {
        return Err(invalid());
    }
    Ok(())
}

/// E.164 phone number: `+`, a non-zero leading digit, 7 to 15 digits total.
pub(crate) fn phone(value: &str) -> Result<(), DomainError> {
    let invalid =
        || DomainError::InvalidCommand(format!("{value:?} is not a valid E.164 phone number"));

    let digits = value.strip_prefix('+').ok_or_else(invalid)?;
    if !(7..=15).contains(&digits.len())
        || !digits.chars().all(|c| c.is_ascii_digit())
        || digits.starts_with('0')
    {
        return Err(invalid());
    }
    Ok(())
}
