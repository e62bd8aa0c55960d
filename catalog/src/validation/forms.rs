//! Form models backing the product and registration screens.
//!
//! A form holds raw text input plus its current errors. Editing a field
//! clears that field's error; submitting evaluates every rule and yields a
//! payload only when all of them pass.

use super::{
    validate_category, validate_confirmation, validate_description, validate_email,
    validate_field, validate_image_url, validate_name, validate_password, validate_price,
    validate_stock, validate_title, FieldError, FieldErrors, FieldKey, Touched,
};
use crate::types::{Product, ProductDraft, Registration};

/// Product create/edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductForm {
    /// Title input.
    pub title: String,
    /// Description input.
    pub description: String,
    /// Price input (parsed on submit).
    pub price: String,
    /// Category input.
    pub category: String,
    /// Stock input (parsed on submit).
    pub stock: String,
    /// Image URL slots; there is always at least one.
    pub images: Vec<String>,
    errors: FieldErrors,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            price: String::new(),
            category: String::new(),
            stock: String::new(),
            images: vec![String::new()],
            errors: FieldErrors::new(),
        }
    }
}

impl ProductForm {
    /// Blank form with one empty image slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Form prefilled from an existing product, for editing.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        let images = if product.images.is_empty() {
            vec![String::new()]
        } else {
            product.images.clone()
        };
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            category: product.category.clone(),
            stock: product.stock.to_string(),
            images,
            errors: FieldErrors::new(),
        }
    }

    /// Current errors.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Set a field's input and clear its error. Returns `false` for fields
    /// this form does not have (including image slots out of range).
    pub fn set(&mut self, field: FieldKey, value: impl Into<String>) -> bool {
        let slot = match field {
            FieldKey::Title => &mut self.title,
            FieldKey::Description => &mut self.description,
            FieldKey::Price => &mut self.price,
            FieldKey::Category => &mut self.category,
            FieldKey::Stock => &mut self.stock,
            FieldKey::Image(index) => match self.images.get_mut(index) {
                Some(slot) => slot,
                None => return false,
            },
            FieldKey::Name | FieldKey::Email | FieldKey::Password | FieldKey::ConfirmPassword => {
                return false;
            },
        };
        *slot = value.into();
        self.errors.clear(field);
        true
    }

    /// Append an empty image slot.
    pub fn add_image_slot(&mut self) {
        self.images.push(String::new());
    }

    /// Remove the image slot at `index`. The last remaining slot is never
    /// removed. Returns whether a slot was removed.
    pub fn remove_image_slot(&mut self, index: usize) -> bool {
        if self.images.len() <= 1 || index >= self.images.len() {
            return false;
        }
        self.images.remove(index);
        // Slot indices shifted
        self.errors.clear_images();
        true
    }

    /// Fields this form validates, in display order.
    #[must_use]
    pub fn fields(&self) -> Vec<FieldKey> {
        let mut fields = vec![
            FieldKey::Title,
            FieldKey::Description,
            FieldKey::Price,
            FieldKey::Category,
            FieldKey::Stock,
        ];
        fields.extend((0..self.images.len()).map(FieldKey::Image));
        fields
    }

    /// Evaluate every rule.
    ///
    /// Empty image slots are dropped from the draft.
    ///
    /// # Errors
    ///
    /// Every failing field, if any rule fails.
    pub fn validate(&self) -> Result<ProductDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.record(FieldKey::Title, validate_title(&self.title));
        errors.record(FieldKey::Description, validate_description(&self.description));
        let price = validate_price(&self.price);
        errors.record(FieldKey::Price, price);
        errors.record(FieldKey::Category, validate_category(&self.category));
        let stock = validate_stock(&self.stock);
        errors.record(FieldKey::Stock, stock);
        for (index, image) in self.images.iter().enumerate() {
            errors.record(FieldKey::Image(index), validate_image_url(image));
        }

        match (price, stock) {
            (Ok(price), Ok(stock)) if errors.is_empty() => Ok(ProductDraft {
                title: self.title.trim().to_string(),
                description: self.description.trim().to_string(),
                price,
                category: self.category.trim().to_string(),
                stock,
                images: self
                    .images
                    .iter()
                    .filter(|image| !image.is_empty())
                    .cloned()
                    .collect(),
            }),
            _ => Err(errors),
        }
    }

    /// Validate and keep the resulting errors on the form.
    pub fn submit(&mut self) -> Option<ProductDraft> {
        match self.validate() {
            Ok(draft) => {
                self.errors = FieldErrors::new();
                Some(draft)
            },
            Err(errors) => {
                self.errors = errors;
                None
            },
        }
    }

    /// Return to a blank form, as after a successful create.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Account registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    /// Name input.
    pub name: String,
    /// Email input.
    pub email: String,
    /// Password input.
    pub password: String,
    /// Password confirmation input; never sent to the server.
    pub confirm_password: String,
    errors: FieldErrors,
    touched: Touched,
}

impl RegistrationForm {
    /// Fields this form validates, in display order.
    pub const FIELDS: [FieldKey; 4] = [
        FieldKey::Name,
        FieldKey::Email,
        FieldKey::Password,
        FieldKey::ConfirmPassword,
    ];

    /// Blank form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current errors, shown or not.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Error of `field` if it has been touched.
    #[must_use]
    pub fn visible_error(&self, field: FieldKey) -> Option<FieldError> {
        self.touched.visible(&self.errors, field)
    }

    fn value(&self, field: FieldKey) -> Option<&str> {
        match field {
            FieldKey::Name => Some(&self.name),
            FieldKey::Email => Some(&self.email),
            FieldKey::Password => Some(&self.password),
            FieldKey::ConfirmPassword => Some(&self.confirm_password),
            _ => None,
        }
    }

    /// Set a field's input and clear its error. Returns `false` for fields
    /// this form does not have.
    pub fn set(&mut self, field: FieldKey, value: impl Into<String>) -> bool {
        let slot = match field {
            FieldKey::Name => &mut self.name,
            FieldKey::Email => &mut self.email,
            FieldKey::Password => &mut self.password,
            FieldKey::ConfirmPassword => &mut self.confirm_password,
            _ => return false,
        };
        *slot = value.into();
        self.errors.clear(field);
        true
    }

    /// The user left `field`: mark it touched and validate it.
    pub fn blur(&mut self, field: FieldKey) {
        let Some(value) = self.value(field) else {
            return;
        };
        let outcome = validate_field(field, value, &self.password);
        self.touched.touch(field);
        self.errors.record(field, outcome);
    }

    /// Evaluate every rule. The confirmation is checked but dropped from
    /// the payload.
    ///
    /// # Errors
    ///
    /// Every failing field, if any rule fails.
    pub fn validate(&self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.record(FieldKey::Name, validate_name(&self.name));
        errors.record(FieldKey::Email, validate_email(&self.email));
        errors.record(FieldKey::Password, validate_password(&self.password));
        errors.record(
            FieldKey::ConfirmPassword,
            validate_confirmation(&self.confirm_password, &self.password),
        );

        if errors.is_empty() {
            Ok(Registration {
                name: self.name.trim().to_string(),
                email: self.email.clone(),
                password: self.password.clone(),
            })
        } else {
            Err(errors)
        }
    }

    /// Touch every field, validate, and keep the resulting errors.
    pub fn submit(&mut self) -> Option<Registration> {
        self.touched.touch_all(Self::FIELDS);
        match self.validate() {
            Ok(registration) => {
                self.errors = FieldErrors::new();
                Some(registration)
            },
            Err(errors) => {
                self.errors = errors;
                None
            },
        }
    }
}
