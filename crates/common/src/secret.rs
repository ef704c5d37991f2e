//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports the [`secrecy`] crate types. Use these for every sensitive
//! value that passes through the service: raw passwords submitted at signup
//! and login, the JWT signing secret, and issued bearer tokens.
//!
//! `SecretString` implements `Debug` with redaction, so any struct deriving
//! `Debug` that holds one is safe to log with `{:?}` or through tracing
//! fields. Secrets are zeroized on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::SecretString;
//! use secrecy::ExposeSecret;
//!
//! #[derive(Debug)]
//! struct LoginForm {
//!     username: String,
//!     password: SecretString,
//! }
//!
//! let form = LoginForm {
//!     username: "alice".to_string(),
//!     password: SecretString::from("secret1"),
//! };
//!
//! // Password is redacted in Debug output
//! println!("{:?}", form);
//!
//! // Reading the value is always explicit
//! let password: &str = form.password.expose_secret();
//! # assert_eq!(password, "secret1");
//! ```

pub use secrecy::{ExposeSecret, SecretString};

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretString::from("hunter2");
        let debug_str = format!("{secret:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("hunter2"));
    }

    #[test]
    fn test_expose_secret_returns_inner_value() {
        let secret = SecretString::from("password123");
        assert_eq!(secret.expose_secret(), "password123");
    }

    #[test]
    fn test_form_with_secret_is_safe() {
        #[allow(dead_code)]
        #[derive(Debug)]
        struct SignupForm {
            username: String,
            email: String,
            password: SecretString,
        }

        let form = SignupForm {
            username: "alice".to_string(),
            email: "a@b.com".to_string(),
            password: SecretString::from("secret1"),
        };

        let debug_str = format!("{form:?}");

        assert!(debug_str.contains("alice"));
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("secret1"));
    }

    #[test]
    fn test_deserialize_from_form_shape() {
        #[allow(dead_code)]
        #[derive(Debug, Deserialize)]
        struct Credentials {
            username: String,
            password: SecretString,
        }

        let json = r#"{"username": "bob", "password": "my-secret-value"}"#;
        let creds: Credentials = serde_json::from_str(json).expect("deserialize");

        assert_eq!(creds.password.expose_secret(), "my-secret-value");

        let debug = format!("{creds:?}");
        assert!(!debug.contains("my-secret-value"));
    }
}
