use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::fmt::{self, Display, Formatter};

/// `Basic` authorization value, `Basic <base64(username:password)>` on a single line
#[derive(Debug)]
pub struct BasicAuthorization<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

impl<'a> BasicAuthorization<'a> {
    pub fn new(username: &'a str, password: &'a str) -> Self {
        BasicAuthorization { username, password }
    }
}

impl<'a> Display for BasicAuthorization<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let token = BASE64.encode(format!("{}:{}", self.username, self.password));
        write!(f, "Basic {}", token)
    }
}

#[cfg(test)]
mod tests {
    use super::BasicAuthorization;

    #[test]
    fn test_basic_header() {
        assert_eq!(
            BasicAuthorization::new("Aladdin", "open sesame").to_string(),
            "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ=="
        );
    }

    #[test]
    fn test_long_credentials_single_line() {
        let password = "x".repeat(200);
        let header = BasicAuthorization::new("someone", &password).to_string();
        assert!(!header.contains('\n'));
        assert!(!header.contains('\r'));
    }
}
