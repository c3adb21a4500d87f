use serde::Deserialize;
use validator::Validate;

/// Body of `POST /api/user/register`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 2, max = 100, message = "first_name must be 2-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 2, max = 100, message = "last_name must be 2-100 characters"))]
    pub last_name: String,
    #[validate(length(min = 10, message = "phone_number must be at least 10 characters"))]
    pub phone_number: String,
    #[validate(
        length(min = 8, message = "password must be at least 8 characters"),
        must_match(other = "password_confirm", message = "password and password_confirm must match")
    )]
    pub password: String,
    pub password_confirm: String,
}

/// Body of `POST /api/user/login`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Query of `GET /api/users`.
///
/// Both values are kept raw: anything missing, unparseable or below one
/// falls back to the default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    #[serde(rename = "recordsPerPage")]
    pub records_per_page: Option<String>,
}

impl ListQuery {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_RECORDS_PER_PAGE: u32 = 10;

    pub fn page(&self) -> u32 {
        positive_or(self.page.as_deref(), Self::DEFAULT_PAGE)
    }

    pub fn records_per_page(&self) -> u32 {
        positive_or(self.records_per_page.as_deref(), Self::DEFAULT_RECORDS_PER_PAGE)
    }
}

fn positive_or(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register() -> RegisterRequest {
        RegisterRequest {
            email: "a@x.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone_number: "1234567890".to_string(),
            password: "password1".to_string(),
            password_confirm: "password1".to_string(),
        }
    }

    #[test]
    fn test_valid_register_request() {
        assert!(register().validate().is_ok());
    }

    #[test]
    fn test_register_field_rules() {
        let mut req = register();
        req.email = "not-an-email".to_string();
        assert!(req.validate().is_err());

        let mut req = register();
        req.first_name = "A".to_string();
        assert!(req.validate().is_err());

        let mut req = register();
        req.phone_number = "12345".to_string();
        assert!(req.validate().is_err());

        let mut req = register();
        req.password = "short".to_string();
        req.password_confirm = "short".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_password_confirmation_must_match() {
        let mut req = register();
        req.password_confirm = "password2".to_string();

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_login_requires_password() {
        let req = LoginRequest {
            email: "a@x.com".to_string(),
            password: String::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_list_query_defaults() {
        let query = ListQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.records_per_page(), 10);

        let query = ListQuery {
            page: Some("0".to_string()),
            records_per_page: Some("abc".to_string()),
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.records_per_page(), 10);

        let query = ListQuery {
            page: Some("-3".to_string()),
            records_per_page: Some("25".to_string()),
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.records_per_page(), 25);
    }
}
