//! Validation of submitted expense forms.
//!
//! [validate_expense] is a pure function: it takes the raw form input, the
//! session of the submitting user and the current time, and either produces a
//! [NewExpense] ready for storage or reports every problem with the input.

use serde::Deserialize;
use time::{Date, OffsetDateTime, Time, macros::format_description};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    Error,
    auth::Session,
    expense::{Category, NewExpense},
};

/// The minimum number of grapheme clusters in the trimmed description and payee fields.
pub(crate) const MIN_TEXT_LENGTH: usize = 2;

pub(crate) const DESCRIPTION_TOO_SHORT: &str = "Description must be at least 2 characters.";
pub(crate) const PAID_TO_REQUIRED: &str = "This field is required.";
pub(crate) const CATEGORY_REQUIRED: &str = "Please select a category.";
pub(crate) const TOTAL_NOT_POSITIVE: &str = "Amount must be a positive number.";
pub(crate) const ADVANCE_NEGATIVE: &str = "Advance cannot be negative.";
pub(crate) const ADVANCE_EXCEEDS_TOTAL: &str = "Advance cannot be more than total amount.";
pub(crate) const NOT_A_NUMBER: &str = "Enter a number.";
pub(crate) const USER_NAME_REQUIRED: &str = "User name is required.";
pub(crate) const INVALID_DATE: &str = "Enter a valid date.";

/// The expense form exactly as the browser sent it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExpenseInput {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub paid_to: String,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub total_amount: String,
    #[serde(default)]
    pub advance_paid: String,
    /// Only read for admins, everyone else records expenses under their own name.
    #[serde(default)]
    pub user_name: Option<String>,
    /// A date in the format "YYYY-MM-DD".
    #[serde(default)]
    pub date: Option<String>,
}

/// A problem with a single form field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// The name of the form field, e.g. "advance_paid".
    pub field: &'static str,
    /// A message that can be shown next to the field.
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_owned(),
        }
    }
}

/// Find the message for `field` in `errors`, if there is one.
pub fn field_error<'a>(errors: &'a [FieldError], field: &str) -> Option<&'a str> {
    errors
        .iter()
        .find(|error| error.field == field)
        .map(|error| error.message.as_str())
}

/// Check `input` and turn it into an expense owned by the right user.
///
/// Non-admins always record expenses under their own display name, whatever
/// the form says. Admins may record expenses for anyone but must name them.
/// An absent date means `now`. A date equal to today's date (in the offset of
/// `now`) also resolves to `now`, any other date resolves to midnight.
///
/// # Errors
/// Returns:
/// - [Error::Validation] listing every invalid field,
/// - or [Error::NameNotSet] if the input is valid but a non-admin has not set a display name.
pub fn validate_expense(
    input: RawExpenseInput,
    session: &Session,
    now: OffsetDateTime,
) -> Result<NewExpense, Error> {
    let mut errors = Vec::new();

    let description = input.description.trim().to_owned();
    if description.graphemes(true).count() < MIN_TEXT_LENGTH {
        errors.push(FieldError::new("description", DESCRIPTION_TOO_SHORT));
    }

    let paid_to = input.paid_to.trim().to_owned();
    if paid_to.graphemes(true).count() < MIN_TEXT_LENGTH {
        errors.push(FieldError::new("paid_to", PAID_TO_REQUIRED));
    }

    let category = match input.category.parse::<Category>() {
        Ok(category) => Some(category),
        Err(_) => {
            errors.push(FieldError::new("category", CATEGORY_REQUIRED));
            None
        }
    };

    let total_amount = match parse_amount(&input.total_amount) {
        Some(amount) if amount > 0.0 => Some(amount),
        Some(_) => {
            errors.push(FieldError::new("total_amount", TOTAL_NOT_POSITIVE));
            None
        }
        None => {
            errors.push(FieldError::new("total_amount", NOT_A_NUMBER));
            None
        }
    };

    let advance_paid = match parse_amount(&input.advance_paid) {
        Some(amount) if amount < 0.0 => {
            errors.push(FieldError::new("advance_paid", ADVANCE_NEGATIVE));
            None
        }
        Some(amount) => match total_amount {
            Some(total_amount) if amount > total_amount => {
                errors.push(FieldError::new("advance_paid", ADVANCE_EXCEEDS_TOTAL));
                None
            }
            _ => Some(amount),
        },
        None => {
            errors.push(FieldError::new("advance_paid", NOT_A_NUMBER));
            None
        }
    };

    let date = match input.date.as_deref().map(str::trim) {
        None | Some("") => Some(now),
        Some(raw_date) => match parse_date(raw_date) {
            Some(date) if date == now.date() => Some(now),
            Some(date) => Some(date.with_time(Time::MIDNIGHT).assume_offset(now.offset())),
            None => {
                errors.push(FieldError::new("date", INVALID_DATE));
                None
            }
        },
    };

    let submitted_name = input
        .user_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());
    if session.is_admin && submitted_name.is_none() {
        errors.push(FieldError::new("user_name", USER_NAME_REQUIRED));
    }

    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    let user_name = if session.is_admin {
        submitted_name.map(str::to_owned)
    } else {
        session.display_name.clone()
    }
    .ok_or(Error::NameNotSet)?;

    let contact_info = input
        .contact_info
        .map(|contact_info| contact_info.trim().to_owned())
        .filter(|contact_info| !contact_info.is_empty());

    match (category, total_amount, advance_paid, date) {
        (Some(category), Some(total_amount), Some(advance_paid), Some(date)) => Ok(NewExpense {
            description,
            paid_to,
            contact_info,
            category,
            total_amount,
            advance_paid,
            date,
            user_name,
        }),
        // Every `None` above has already recorded a field error.
        _ => Err(Error::Validation(Vec::new())),
    }
}

/// Parse a number typed into an amount field.
///
/// Empty input counts as zero. Returns `None` for anything that is not a
/// finite number.
fn parse_amount(raw_amount: &str) -> Option<f64> {
    let raw_amount = raw_amount.trim();

    if raw_amount.is_empty() {
        return Some(0.0);
    }

    raw_amount
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

fn parse_date(raw_date: &str) -> Option<Date> {
    Date::parse(raw_date, format_description!("[year]-[month]-[day]")).ok()
}
