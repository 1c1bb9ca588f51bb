//! Form validation with per-field error messages.
//!
//! Each form is posted as raw strings and validated into the body the
//! external service expects. Every failing field gets one message; the
//! handlers re-render the form with those messages next to the inputs.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{Months, NaiveDate};
use regex::Regex;
use serde::Deserialize;

use crate::models::{NewComment, NewUser, Product, ProductInput, ShippingInfo, User, UserUpdate};
use crate::regions::is_region;
use crate::types::{Clp, CommentBody, Email, Rating, Rut, UserRole};

/// Longest accepted first or last name, in characters.
pub const MAX_NAME_CHARS: usize = 50;
/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_CHARS: usize = 8;
/// Longest accepted password, in characters.
pub const MAX_PASSWORD_CHARS: usize = 64;
/// Minimum age to register.
pub const MIN_AGE_YEARS: u32 = 18;

/// Date format used by `<input type="date">`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `+569XXXXXXXX` or `9XXXXXXXX`.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\+56)?9\d{8}$").expect("Invalid regex"));

/// Validation messages keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`. The first message per field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Field/message pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, Self> {
        match value {
            Some(value) if self.is_empty() => Ok(value),
            _ => Err(self),
        }
    }
}

// =============================================================================
// Field helpers
// =============================================================================

fn required(errors: &mut FieldErrors, field: &'static str, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, "Este campo es obligatorio");
        None
    } else {
        Some(value.to_string())
    }
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn name(errors: &mut FieldErrors, field: &'static str, value: &str) -> Option<String> {
    let value = required(errors, field, value)?;
    if value.chars().count() > MAX_NAME_CHARS {
        errors.add(
            field,
            format!("Debe tener como máximo {MAX_NAME_CHARS} caracteres"),
        );
        return None;
    }
    Some(value)
}

fn email(errors: &mut FieldErrors, field: &'static str, value: &str) -> Option<Email> {
    Email::parse(value)
        .map_err(|e| errors.add(field, e.to_string()))
        .ok()
}

fn region(errors: &mut FieldErrors, field: &'static str, value: &str) -> Option<String> {
    let value = required(errors, field, value)?;
    if !is_region(&value) {
        errors.add(field, "Selecciona una región válida");
        return None;
    }
    Some(value)
}

/// Validate an optional phone number, returning it without spaces.
fn phone(errors: &mut FieldErrors, field: &'static str, value: Option<&str>) -> Option<String> {
    let compact: String = value?.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    if !PHONE_RE.is_match(&compact) {
        errors.add(field, "Usa el formato +569XXXXXXXX o 9XXXXXXXX");
        return None;
    }
    Some(compact)
}

/// `true` if someone born on `birth_date` is at least [`MIN_AGE_YEARS`] on `today`.
#[must_use]
pub fn is_adult(birth_date: NaiveDate, today: NaiveDate) -> bool {
    birth_date
        .checked_add_months(Months::new(MIN_AGE_YEARS * 12))
        .is_some_and(|adult_on| adult_on <= today)
}

fn birth_date(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    today: NaiveDate,
) -> Option<NaiveDate> {
    let value = required(errors, field, value)?;
    let Ok(date) = NaiveDate::parse_from_str(&value, DATE_FORMAT) else {
        errors.add(field, "Fecha inválida");
        return None;
    };
    if date > today {
        errors.add(field, "La fecha no puede estar en el futuro");
        return None;
    }
    if !is_adult(date, today) {
        errors.add(field, format!("Debes tener al menos {MIN_AGE_YEARS} años"));
        return None;
    }
    Some(date)
}

fn password(
    errors: &mut FieldErrors,
    value: &str,
    confirmation: &str,
    required_field: bool,
) -> Option<String> {
    if value.is_empty() && !required_field {
        return None;
    }
    let len = value.chars().count();
    if !(MIN_PASSWORD_CHARS..=MAX_PASSWORD_CHARS).contains(&len) {
        errors.add(
            "password",
            format!("La contraseña debe tener entre {MIN_PASSWORD_CHARS} y {MAX_PASSWORD_CHARS} caracteres"),
        );
        return None;
    }
    if value != confirmation {
        errors.add("password_confirm", "Las contraseñas no coinciden");
        return None;
    }
    Some(value.to_string())
}

// =============================================================================
// Users
// =============================================================================

/// Registration form on the storefront, and the user form in the admin.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub rut: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub commune: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Admin only; the storefront always registers `USER`.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

impl UserForm {
    /// Form pre-filled from an existing user. Passwords stay blank.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            rut: Rut::parse(&user.rut).map_or_else(|_| user.rut.clone(), |rut| rut.formatted()),
            email: user.email.clone(),
            birth_date: user.birth_date.format(DATE_FORMAT).to_string(),
            region: user.region.clone(),
            commune: user.commune.clone(),
            address: user.address.clone(),
            phone: user.phone.clone(),
            role: Some(user.role.as_str().to_string()),
            password: String::new(),
            password_confirm: String::new(),
        }
    }

    fn role(&self, errors: &mut FieldErrors) -> UserRole {
        match self.role.as_deref().map(str::trim) {
            None | Some("") => UserRole::User,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                errors.add("role", "Rol inválido");
                UserRole::User
            }),
        }
    }
}

struct Profile {
    first_name: String,
    last_name: String,
    rut: Rut,
    email: Email,
    birth_date: NaiveDate,
    region: String,
    commune: String,
    address: String,
    phone: Option<String>,
}

fn profile(form: &UserForm, today: NaiveDate, errors: &mut FieldErrors) -> Option<Profile> {
    let first_name = name(errors, "first_name", &form.first_name);
    let last_name = name(errors, "last_name", &form.last_name);
    let rut = Rut::parse(&form.rut)
        .map_err(|e| errors.add("rut", e.to_string()))
        .ok();
    let email = email(errors, "email", &form.email);
    let birth_date = birth_date(errors, "birth_date", &form.birth_date, today);
    let region = region(errors, "region", &form.region);
    let address = required(errors, "address", &form.address);
    let phone = phone(errors, "phone", form.phone.as_deref());

    Some(Profile {
        first_name: first_name?,
        last_name: last_name?,
        rut: rut?,
        email: email?,
        birth_date: birth_date?,
        region: region?,
        commune: form.commune.trim().to_string(),
        address: address?,
        phone,
    })
}

fn new_user(profile: Profile, role: UserRole, password: String) -> NewUser {
    NewUser {
        first_name: profile.first_name,
        last_name: profile.last_name,
        rut: profile.rut,
        birth_date: profile.birth_date,
        region: profile.region,
        commune: profile.commune,
        address: profile.address,
        email: profile.email,
        phone: profile.phone,
        role,
        password,
    }
}

/// Validate a storefront registration. The role is always `USER`.
///
/// # Errors
///
/// Returns every failing field.
pub fn validate_registration(form: &UserForm, today: NaiveDate) -> Result<NewUser, FieldErrors> {
    let mut errors = FieldErrors::new();
    let profile = profile(form, today, &mut errors);
    let password = password(&mut errors, &form.password, &form.password_confirm, true);
    let user = profile
        .zip(password)
        .map(|(profile, password)| new_user(profile, UserRole::User, password));
    errors.finish(user)
}

/// Validate a user created from the admin. The role comes from the form.
///
/// # Errors
///
/// Returns every failing field.
pub fn validate_new_user(form: &UserForm, today: NaiveDate) -> Result<NewUser, FieldErrors> {
    let mut errors = FieldErrors::new();
    let role = form.role(&mut errors);
    let profile = profile(form, today, &mut errors);
    let password = password(&mut errors, &form.password, &form.password_confirm, true);
    let user = profile
        .zip(password)
        .map(|(profile, password)| new_user(profile, role, password));
    errors.finish(user)
}

/// Validate an admin user edit. A blank password keeps the current one.
///
/// # Errors
///
/// Returns every failing field.
pub fn validate_user_update(form: &UserForm, today: NaiveDate) -> Result<UserUpdate, FieldErrors> {
    let mut errors = FieldErrors::new();
    let role = form.role(&mut errors);
    let profile = profile(form, today, &mut errors);
    let password = password(&mut errors, &form.password, &form.password_confirm, false);
    let update = profile.map(|p| UserUpdate {
        first_name: p.first_name,
        last_name: p.last_name,
        rut: p.rut,
        birth_date: p.birth_date,
        region: p.region,
        commune: p.commune,
        address: p.address,
        email: p.email,
        phone: p.phone,
        role,
        password,
    });
    errors.finish(update)
}

// =============================================================================
// Comments
// =============================================================================

/// Review form on the product page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub rating: String,
}

/// Validate a product review.
///
/// # Errors
///
/// Returns every failing field.
pub fn validate_comment(form: &CommentForm) -> Result<NewComment, FieldErrors> {
    let mut errors = FieldErrors::new();
    let author = name(&mut errors, "author", &form.author);
    let body = CommentBody::parse(&form.body)
        .map_err(|e| errors.add("body", e.to_string()))
        .ok();
    let rating = match form.rating.trim().parse::<i64>() {
        Ok(value) => Rating::new(value)
            .map_err(|e| errors.add("rating", e.to_string()))
            .ok(),
        Err(_) => {
            errors.add("rating", "Selecciona una calificación");
            None
        }
    };

    let comment = match (author, body, rating) {
        (Some(author), Some(body), Some(rating)) => Some(NewComment {
            author,
            body,
            rating,
        }),
        _ => None,
    };
    errors.finish(comment)
}

// =============================================================================
// Products
// =============================================================================

/// Admin product form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl ProductForm {
    /// Form pre-filled from an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price.pesos().to_string(),
            stock: product.stock.to_string(),
            description: product.description.clone(),
            origin: product.origin.clone(),
            image: product.image.clone(),
        }
    }
}

/// Validate a product form: name and category required, price and stock
/// whole numbers ≥ 0.
///
/// # Errors
///
/// Returns every failing field.
pub fn validate_product(form: &ProductForm) -> Result<ProductInput, FieldErrors> {
    let mut errors = FieldErrors::new();
    let name = required(&mut errors, "name", &form.name);
    let category = required(&mut errors, "category", &form.category);

    let price = match form.price.trim().parse::<i64>() {
        Ok(value) if value >= 0 => Some(Clp::new(value)),
        Ok(_) => {
            errors.add("price", "El precio debe ser mayor o igual a 0");
            None
        }
        Err(_) => {
            errors.add("price", "Ingresa un precio en pesos, sin puntos");
            None
        }
    };
    let stock = match form.stock.trim().parse::<i64>() {
        Ok(value) if value >= 0 => u32::try_from(value)
            .map_err(|_| errors.add("stock", "Stock demasiado grande"))
            .ok(),
        Ok(_) => {
            errors.add("stock", "El stock debe ser mayor o igual a 0");
            None
        }
        Err(_) => {
            errors.add("stock", "Ingresa un número entero");
            None
        }
    };

    let product = match (name, category, price, stock) {
        (Some(name), Some(category), Some(price), Some(stock)) => Some(ProductInput {
            name,
            category,
            price,
            stock,
            description: form.description.trim().to_string(),
            origin: form.origin.trim().to_string(),
            image: optional(form.image.as_deref()),
        }),
        _ => None,
    };
    errors.finish(product)
}

// =============================================================================
// Checkout
// =============================================================================

/// Shipping details collected at checkout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShippingForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub commune: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ShippingForm {
    /// Form pre-filled from the logged-in user's profile.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            region: user.region.clone(),
            commune: user.commune.clone(),
            address: user.address.clone(),
            notes: None,
        }
    }
}

/// Validate checkout shipping details.
///
/// # Errors
///
/// Returns every failing field.
pub fn validate_shipping(form: &ShippingForm) -> Result<ShippingInfo, FieldErrors> {
    let mut errors = FieldErrors::new();
    let first_name = name(&mut errors, "first_name", &form.first_name);
    let last_name = name(&mut errors, "last_name", &form.last_name);
    let email = email(&mut errors, "email", &form.email);
    let phone = phone(&mut errors, "phone", form.phone.as_deref());
    let region = region(&mut errors, "region", &form.region);
    let commune = required(&mut errors, "commune", &form.commune);
    let address = required(&mut errors, "address", &form.address);

    let info = match (first_name, last_name, email, region, commune, address) {
        (
            Some(first_name),
            Some(last_name),
            Some(email),
            Some(region),
            Some(commune),
            Some(address),
        ) => Some(ShippingInfo {
            first_name,
            last_name,
            email,
            phone,
            region,
            commune,
            address,
            notes: optional(form.notes.as_deref()),
        }),
        _ => None,
    };
    errors.finish(info)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn registration() -> UserForm {
        UserForm {
            first_name: "Ana".to_string(),
            last_name: "Pérez".to_string(),
            rut: "12.345.678-5".to_string(),
            email: "Ana@Duoc.cl".to_string(),
            birth_date: "1990-05-01".to_string(),
            region: "Región de Valparaíso".to_string(),
            commune: "Viña del Mar".to_string(),
            address: "Av. Libertad 100".to_string(),
            phone: Some("+56 9 1234 5678".to_string()),
            role: None,
            password: "huerto2025".to_string(),
            password_confirm: "huerto2025".to_string(),
        }
    }

    #[test]
    fn test_valid_registration() {
        let user = validate_registration(&registration(), today()).unwrap();
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.email.as_str(), "ana@duoc.cl");
        assert_eq!(user.rut.to_string(), "12345678-5");
        assert_eq!(user.phone.as_deref(), Some("+56912345678"));
    }

    #[test]
    fn test_registration_ignores_submitted_role() {
        let mut form = registration();
        form.role = Some("ADMIN".to_string());
        let user = validate_registration(&form, today()).unwrap();
        assert_eq!(user.role, UserRole::User);
    }

    #[test]
    fn test_registration_collects_every_error() {
        let form = UserForm {
            first_name: "a".repeat(51),
            rut: "12345678-9".to_string(),
            email: "no-at".to_string(),
            birth_date: "2010-01-01".to_string(),
            region: "Mendoza".to_string(),
            phone: Some("12345".to_string()),
            password: "short".to_string(),
            password_confirm: "short".to_string(),
            ..UserForm::default()
        };
        let errors = validate_registration(&form, today()).unwrap_err();
        for field in [
            "first_name",
            "last_name",
            "rut",
            "email",
            "birth_date",
            "region",
            "address",
            "phone",
            "password",
        ] {
            assert!(errors.has(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_password_confirmation_must_match() {
        let mut form = registration();
        form.password_confirm = "different1".to_string();
        let errors = validate_registration(&form, today()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("password_confirm"), Some("Las contraseñas no coinciden"));
    }

    #[test]
    fn test_is_adult_boundary() {
        let birth = NaiveDate::from_ymd_opt(2007, 6, 15).unwrap();
        assert!(is_adult(birth, today()));
        assert!(!is_adult(birth, NaiveDate::from_ymd_opt(2025, 6, 14).unwrap()));
    }

    #[test]
    fn test_phone_formats() {
        let mut errors = FieldErrors::new();
        assert_eq!(
            phone(&mut errors, "phone", Some("912345678")).as_deref(),
            Some("912345678")
        );
        assert_eq!(phone(&mut errors, "phone", Some("  ")), None);
        assert_eq!(phone(&mut errors, "phone", None), None);
        assert!(errors.is_empty());

        assert_eq!(phone(&mut errors, "phone", Some("+56212345678")), None);
        assert!(errors.has("phone"));
    }

    #[test]
    fn test_user_update_password_is_optional() {
        let mut form = registration();
        form.role = Some("ADMIN".to_string());
        form.password = String::new();
        form.password_confirm = String::new();
        let update = validate_user_update(&form, today()).unwrap();
        assert_eq!(update.role, UserRole::Admin);
        assert!(update.password.is_none());

        assert!(validate_new_user(&form, today()).unwrap_err().has("password"));
    }

    #[test]
    fn test_comment_rules() {
        let ok = CommentForm {
            author: "Ana".to_string(),
            body: "Muy frescas".to_string(),
            rating: "5".to_string(),
        };
        assert_eq!(validate_comment(&ok).unwrap().rating.stars(), 5);

        let too_long = CommentForm {
            body: "x".repeat(101),
            ..ok.clone()
        };
        assert!(validate_comment(&too_long).unwrap_err().has("body"));

        let exactly_max = CommentForm {
            body: "x".repeat(100),
            ..ok.clone()
        };
        assert!(validate_comment(&exactly_max).is_ok());

        for rating in ["0", "6", "", "cinco"] {
            let form = CommentForm {
                rating: rating.to_string(),
                ..ok.clone()
            };
            assert!(validate_comment(&form).unwrap_err().has("rating"));
        }
    }

    #[test]
    fn test_product_rules() {
        let form = ProductForm {
            name: "Miel Orgánica".to_string(),
            category: "Productos Orgánicos".to_string(),
            price: "5000".to_string(),
            stock: "0".to_string(),
            image: Some(String::new()),
            ..ProductForm::default()
        };
        let input = validate_product(&form).unwrap();
        assert_eq!(input.price, Clp::new(5000));
        assert_eq!(input.stock, 0);
        assert!(input.image.is_none());

        let bad = ProductForm {
            name: " ".to_string(),
            price: "-1".to_string(),
            stock: "-3".to_string(),
            ..form
        };
        let errors = validate_product(&bad).unwrap_err();
        assert!(errors.has("name"));
        assert!(errors.has("price"));
        assert!(errors.has("stock"));
        assert!(!errors.has("category"));
    }

    #[test]
    fn test_shipping_requires_commune() {
        let form = ShippingForm {
            first_name: "Ana".to_string(),
            last_name: "Pérez".to_string(),
            email: "ana@duoc.cl".to_string(),
            phone: None,
            region: "Región del Biobío".to_string(),
            commune: String::new(),
            address: "O'Higgins 100".to_string(),
            notes: Some("  ".to_string()),
        };
        let errors = validate_shipping(&form).unwrap_err();
        assert_eq!(errors.iter().map(|(f, _)| f).collect::<Vec<_>>(), vec!["commune"]);

        let info = validate_shipping(&ShippingForm {
            commune: "Concepción".to_string(),
            ..form
        })
        .unwrap();
        assert!(info.notes.is_none());
    }
}
