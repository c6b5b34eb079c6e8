use sqlx::types::BigDecimal;
use std::fmt;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 32;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const CARD_NAME_MAX_LEN: usize = 100;
pub const PHONE_MAX_LEN: usize = 15;

pub const CITIES: &[&str] = &["Quito", "Machala", "Guayaquil", "Cuenca", "Ambato"];

pub const PREFERRED_STORES: &[&str] = &[
    "monkey_planet",
    "baul_del_enano",
    "dragonscave",
    "camelot",
    "tiempo_de_juegos",
];

pub const TRANSACTION_PREFERENCES: &[&str] =
    &["sell_only", "trade_only", "trade_and_sell", "display_only"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

pub fn validate_enum(field: &'static str, value: &str, allowed: &[&str]) -> ValidationResult {
    if allowed.iter().all(|candidate| value != *candidate) {
        return Err(ValidationError::new(
            field,
            format!("must be one of: {}", allowed.join(", ")),
        ));
    }

    Ok(())
}

pub fn validate_username(username: &str) -> ValidationResult {
    let username = sanitize_string(username);
    validate_required("username", &username)?;

    if username.len() < USERNAME_MIN_LEN || username.len() > USERNAME_MAX_LEN {
        return Err(ValidationError::new(
            "username",
            format!(
                "must be between {} and {} characters",
                USERNAME_MIN_LEN, USERNAME_MAX_LEN
            ),
        ));
    }

    if !username
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    {
        return Err(ValidationError::new(
            "username",
            "must contain only letters, digits and underscores",
        ));
    }

    Ok(())
}

pub fn validate_email(email: &str) -> ValidationResult {
    let email = sanitize_string(email);
    validate_required("email", &email)?;

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ValidationError::new("email", "is not a valid address"));
    }

    Ok(())
}

pub fn validate_password(password: &str) -> ValidationResult {
    if password.len() < PASSWORD_MIN_LEN {
        return Err(ValidationError::new(
            "password",
            format!("must be at least {} characters", PASSWORD_MIN_LEN),
        ));
    }

    Ok(())
}

pub fn validate_city(city: &str) -> ValidationResult {
    validate_enum("city", city, CITIES)
}

pub fn validate_preferred_store(store: &str) -> ValidationResult {
    validate_enum("preferred_store", store, PREFERRED_STORES)
}

pub fn validate_transaction_preference(preference: &str) -> ValidationResult {
    validate_enum("transaction_preference", preference, TRANSACTION_PREFERENCES)
}

pub fn validate_card_name(name: &str) -> ValidationResult {
    let name = sanitize_string(name);
    validate_required("card_name", &name)?;
    validate_max_len("card_name", &name, CARD_NAME_MAX_LEN)?;

    Ok(())
}

pub fn validate_quantity(field: &'static str, quantity: i32) -> ValidationResult {
    if quantity < 0 {
        return Err(ValidationError::new(field, "must not be negative"));
    }

    Ok(())
}

pub fn validate_price(price: &BigDecimal) -> ValidationResult {
    if price < &BigDecimal::from(0) {
        return Err(ValidationError::new("price", "must not be negative"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn validates_required_field() {
        assert!(validate_required("field", "value").is_ok());
        assert!(validate_required("field", "   ").is_err());
    }

    #[test]
    fn validates_max_len() {
        assert!(validate_max_len("field", "abc", 3).is_ok());
        assert!(validate_max_len("field", "abcd", 3).is_err());
    }

    #[test]
    fn validates_enum_values() {
        assert!(validate_enum("city", "Quito", CITIES).is_ok());
        assert!(validate_enum("city", "Bogota", CITIES).is_err());
    }

    #[test]
    fn sanitizes_string() {
        assert_eq!(sanitize_string("  hello\tworld  "), "hello world");
        assert_eq!(sanitize_string("single"), "single");
        assert_eq!(sanitize_string(" \n "), "");
        assert_eq!(sanitize_string("ab\u{0000}cd\u{0007}"), "abcd");
    }

    #[test]
    fn validates_username() {
        assert!(validate_username("ana_22").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username("ana maria").is_err());
        assert!(validate_username("ana!").is_err());
    }

    #[test]
    fn validates_email() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("ana@localhost").is_err());
        assert!(validate_email("example.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn validates_password_length() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn validates_profile_choices() {
        assert!(validate_city("Cuenca").is_ok());
        assert!(validate_city("cuenca").is_err());
        assert!(validate_preferred_store("camelot").is_ok());
        assert!(validate_preferred_store("ebay").is_err());
        assert!(validate_transaction_preference("display_only").is_ok());
        assert!(validate_transaction_preference("hoard").is_err());
    }

    #[test]
    fn validates_card_name() {
        assert!(validate_card_name("Lightning Bolt").is_ok());
        assert!(validate_card_name("  ").is_err());
        assert!(validate_card_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn validates_quantity_and_price() {
        assert!(validate_quantity("quantity_owned", 0).is_ok());
        assert!(validate_quantity("quantity_owned", -1).is_err());

        let price = BigDecimal::from_str("2.50").unwrap();
        assert!(validate_price(&price).is_ok());
        assert!(validate_price(&BigDecimal::from(-1)).is_err());
    }
}
