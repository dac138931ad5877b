use std::borrow::Cow;

use crate::money::Money;

pub const MAX_EMAIL_LENGTH: usize = 255;
pub const MAX_EMOJI_LENGTH: usize = 16;
pub const MAX_AMOUNT: Money = Money::from_cents(100_000_000_000_000);

#[derive(Debug)]
pub enum Validity {
    Valid,
    Invalid(Cow<'static, str>),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        match &self {
            Validity::Valid => true,
            Validity::Invalid(_) => false,
        }
    }
}

/// Loose check for emails handed over by the identity provider. Anything stricter is the
/// provider's job.
pub fn validate_email_address(email: &str) -> Validity {
    if email.len() > MAX_EMAIL_LENGTH {
        return Validity::Invalid(Cow::Owned(format!(
            "Email address cannot be longer than {MAX_EMAIL_LENGTH} bytes"
        )));
    }

    if email.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Validity::Invalid(Cow::Borrowed("Email address cannot contain whitespace"));
    }

    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && !domain.is_empty() => Validity::Valid,
        Some(_) => Validity::Invalid(Cow::Borrowed(
            "Email username and domain name cannot be empty",
        )),
        None => Validity::Invalid(Cow::Borrowed("Email address must contain an at symbol (@)")),
    }
}

pub fn validate_not_blank(value: &str, field_name: &'static str) -> Validity {
    if value.trim().is_empty() {
        return Validity::Invalid(Cow::Owned(format!("{field_name} cannot be blank")));
    }

    Validity::Valid
}

pub fn validate_max_length(value: &str, field_name: &'static str, max_chars: usize) -> Validity {
    if value.chars().count() > max_chars {
        return Validity::Invalid(Cow::Owned(format!(
            "{field_name} cannot be longer than {max_chars} characters"
        )));
    }

    Validity::Valid
}

pub fn validate_amount(amount: Money, field_name: &'static str) -> Validity {
    if !amount.is_positive() {
        return Validity::Invalid(Cow::Owned(format!("{field_name} must be greater than zero")));
    }

    if amount > MAX_AMOUNT {
        return Validity::Invalid(Cow::Owned(format!(
            "{field_name} cannot be more than {MAX_AMOUNT}"
        )));
    }

    Validity::Valid
}

pub fn validate_emoji(emoji: &str) -> Validity {
    if emoji.len() > MAX_EMOJI_LENGTH {
        return Validity::Invalid(Cow::Owned(format!(
            "Emoji cannot be longer than {MAX_EMOJI_LENGTH} bytes"
        )));
    }

    Validity::Valid
}
