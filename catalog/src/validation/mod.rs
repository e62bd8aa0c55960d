//! Field validation engine.
//!
//! Pure, side-effect free rules, one per field. Re-validating an unchanged
//! value always yields the same verdict. Failures never reach the network:
//! a form only produces a payload once every rule passes.
//!
//! | Field | Valid when |
//! |---|---|
//! | `title`, `description`, `category` | non-empty after trimming |
//! | `price` | a finite number > 0 |
//! | `stock` | a whole number ≥ 0 |
//! | `image-<n>` | empty, or an absolute URL |
//! | `name` | at least 2 characters after trimming |
//! | `email` | shaped like `local@domain.tld` |
//! | `password` | at least 6 characters |
//! | `confirmPassword` | equal to the password |

mod forms;

pub use forms::{ProductForm, RegistrationForm};

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Minimum trimmed length of a registration name.
pub const MIN_NAME_LEN: usize = 2;
/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 6;

#[allow(clippy::expect_used)] // Literal pattern
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern is valid"));

/// A validated form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKey {
    /// Product title.
    Title,
    /// Product description.
    Description,
    /// Product price.
    Price,
    /// Product category.
    Category,
    /// Product stock.
    Stock,
    /// Product image URL slot, by index.
    Image(usize),
    /// Registration name.
    Name,
    /// Email address.
    Email,
    /// Password.
    Password,
    /// Password confirmation.
    ConfirmPassword,
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => f.write_str("title"),
            Self::Description => f.write_str("description"),
            Self::Price => f.write_str("price"),
            Self::Category => f.write_str("category"),
            Self::Stock => f.write_str("stock"),
            Self::Image(index) => write!(f, "image-{index}"),
            Self::Name => f.write_str("name"),
            Self::Email => f.write_str("email"),
            Self::Password => f.write_str("password"),
            Self::ConfirmPassword => f.write_str("confirmPassword"),
        }
    }
}

/// Unrecognized field name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown field {0:?}")]
pub struct UnknownField(pub String);

impl FromStr for FieldKey {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s {
            "title" => Self::Title,
            "description" => Self::Description,
            "price" => Self::Price,
            "category" => Self::Category,
            "stock" => Self::Stock,
            "name" => Self::Name,
            "email" => Self::Email,
            "password" => Self::Password,
            "confirmPassword" => Self::ConfirmPassword,
            other => other
                .strip_prefix("image-")
                .and_then(|index| index.parse().ok())
                .map(Self::Image)
                .ok_or_else(|| UnknownField(other.to_string()))?,
        };
        Ok(key)
    }
}

/// A failed field rule, carrying its user-facing message.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// Empty title.
    #[error("Product title is required")]
    TitleRequired,
    /// Empty description.
    #[error("Description is required")]
    DescriptionRequired,
    /// Missing, non-numeric or non-positive price.
    #[error("Valid price is required")]
    InvalidPrice,
    /// Empty category.
    #[error("Category is required")]
    CategoryRequired,
    /// Missing, fractional or negative stock.
    #[error("Valid stock quantity is required")]
    InvalidStock,
    /// Non-empty image slot that is not an absolute URL.
    #[error("Please enter a valid URL")]
    InvalidUrl,
    /// Empty name.
    #[error("Full name is required")]
    NameRequired,
    /// Name shorter than [`MIN_NAME_LEN`].
    #[error("Name must be at least 2 characters")]
    NameTooShort,
    /// Empty email.
    #[error("Email is required")]
    EmailRequired,
    /// Email without a `local@domain.tld` shape.
    #[error("Email address is invalid")]
    InvalidEmail,
    /// Empty password.
    #[error("Password is required")]
    PasswordRequired,
    /// Password shorter than [`MIN_PASSWORD_LEN`].
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    /// Empty confirmation.
    #[error("Please confirm your password")]
    ConfirmationRequired,
    /// Confirmation differs from the password.
    #[error("Passwords do not match")]
    PasswordMismatch,
}

fn required(value: &str, error: FieldError) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        Err(error)
    } else {
        Ok(())
    }
}

/// Product title rule.
///
/// # Errors
///
/// [`FieldError::TitleRequired`] if blank.
pub fn validate_title(value: &str) -> Result<(), FieldError> {
    required(value, FieldError::TitleRequired)
}

/// Product description rule.
///
/// # Errors
///
/// [`FieldError::DescriptionRequired`] if blank.
pub fn validate_description(value: &str) -> Result<(), FieldError> {
    required(value, FieldError::DescriptionRequired)
}

/// Product category rule.
///
/// # Errors
///
/// [`FieldError::CategoryRequired`] if blank.
pub fn validate_category(value: &str) -> Result<(), FieldError> {
    required(value, FieldError::CategoryRequired)
}

/// Product price rule, returning the parsed price.
///
/// # Errors
///
/// [`FieldError::InvalidPrice`] unless the value is a finite number > 0.
pub fn validate_price(value: &str) -> Result<f64, FieldError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price > 0.0)
        .ok_or(FieldError::InvalidPrice)
}

/// Product stock rule, returning the parsed quantity.
///
/// # Errors
///
/// [`FieldError::InvalidStock`] unless the value is a whole number ≥ 0.
pub fn validate_stock(value: &str) -> Result<u32, FieldError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| FieldError::InvalidStock)
}

/// Image slot rule. Empty slots are valid (unset).
///
/// # Errors
///
/// [`FieldError::InvalidUrl`] unless empty or an absolute URL.
pub fn validate_image_url(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        return Ok(());
    }
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|_| FieldError::InvalidUrl)
}

/// Registration name rule.
///
/// # Errors
///
/// [`FieldError::NameRequired`] if blank, [`FieldError::NameTooShort`] if
/// shorter than [`MIN_NAME_LEN`] after trimming.
pub fn validate_name(value: &str) -> Result<(), FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(FieldError::NameRequired)
    } else if trimmed.chars().count() < MIN_NAME_LEN {
        Err(FieldError::NameTooShort)
    } else {
        Ok(())
    }
}

/// Email rule.
///
/// # Errors
///
/// [`FieldError::EmailRequired`] if empty, [`FieldError::InvalidEmail`] if
/// not shaped like `local@domain.tld`.
pub fn validate_email(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        Err(FieldError::EmailRequired)
    } else if EMAIL_SHAPE.is_match(value) {
        Ok(())
    } else {
        Err(FieldError::InvalidEmail)
    }
}

/// Password rule.
///
/// # Errors
///
/// [`FieldError::PasswordRequired`] if empty, [`FieldError::PasswordTooShort`]
/// if shorter than [`MIN_PASSWORD_LEN`].
pub fn validate_password(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        Err(FieldError::PasswordRequired)
    } else if value.chars().count() < MIN_PASSWORD_LEN {
        Err(FieldError::PasswordTooShort)
    } else {
        Ok(())
    }
}

/// Password confirmation rule.
///
/// # Errors
///
/// [`FieldError::ConfirmationRequired`] if empty,
/// [`FieldError::PasswordMismatch`] if different from `password`.
pub fn validate_confirmation(value: &str, password: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        Err(FieldError::ConfirmationRequired)
    } else if value == password {
        Ok(())
    } else {
        Err(FieldError::PasswordMismatch)
    }
}

/// Validate one field by name.
///
/// `password` is the cross-field context used by
/// [`FieldKey::ConfirmPassword`]; other fields ignore it.
///
/// # Errors
///
/// The [`FieldError`] of the failing rule.
pub fn validate_field(field: FieldKey, value: &str, password: &str) -> Result<(), FieldError> {
    match field {
        FieldKey::Title => validate_title(value),
        FieldKey::Description => validate_description(value),
        FieldKey::Price => validate_price(value).map(|_| ()),
        FieldKey::Category => validate_category(value),
        FieldKey::Stock => validate_stock(value).map(|_| ()),
        FieldKey::Image(_) => validate_image_url(value),
        FieldKey::Name => validate_name(value),
        FieldKey::Email => validate_email(value),
        FieldKey::Password => validate_password(value),
        FieldKey::ConfirmPassword => validate_confirmation(value, password),
    }
}

/// Errors of a form, by field, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<FieldKey, FieldError>);

impl FieldErrors {
    /// No errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a rule: set the error on failure, clear it on
    /// success.
    pub fn record<T>(&mut self, field: FieldKey, outcome: Result<T, FieldError>) {
        match outcome {
            Ok(_) => {
                self.0.remove(&field);
            },
            Err(error) => {
                self.0.insert(field, error);
            },
        }
    }

    /// Set the error of `field`.
    pub fn insert(&mut self, field: FieldKey, error: FieldError) {
        self.0.insert(field, error);
    }

    /// Drop the error of `field`, e.g. when the user edits it.
    pub fn clear(&mut self, field: FieldKey) {
        self.0.remove(&field);
    }

    /// Drop every image slot error.
    pub fn clear_images(&mut self) {
        self.0.retain(|field, _| !matches!(field, FieldKey::Image(_)));
    }

    /// Error of `field`, if any.
    #[must_use]
    pub fn get(&self, field: FieldKey) -> Option<FieldError> {
        self.0.get(&field).copied()
    }

    /// Whether every rule passed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Failing fields with their errors, in field order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, FieldError)> + '_ {
        self.0.iter().map(|(field, error)| (*field, *error))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, error) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {error}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Fields the user has interacted with.
///
/// Touch state only gates whether an error is shown; it never changes
/// whether a submission passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Touched(BTreeSet<FieldKey>);

impl Touched {
    /// Nothing touched.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `field` as interacted with.
    pub fn touch(&mut self, field: FieldKey) {
        self.0.insert(field);
    }

    /// Mark every field in `fields`, as on submit.
    pub fn touch_all(&mut self, fields: impl IntoIterator<Item = FieldKey>) {
        self.0.extend(fields);
    }

    /// Whether `field` has been touched.
    #[must_use]
    pub fn is_touched(&self, field: FieldKey) -> bool {
        self.0.contains(&field)
    }

    /// The error of `field` if it should be displayed.
    #[must_use]
    pub fn visible(&self, errors: &FieldErrors, field: FieldKey) -> Option<FieldError> {
        if self.is_touched(field) {
            errors.get(field)
        } else {
            None
        }
    }
}
