use crate::config::AuthConfig;

/// Renders `Set-Cookie` header values for the session key.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, secure: bool) -> Self {
        SessionCookie {
            name: name.into(),
            secure,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.session_cookie_name.clone(), config.secure_cookies)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cookie carrying a freshly issued (or refreshed) session key.
    pub fn issue(&self, session_key: &str) -> String {
        self.render(session_key, None)
    }

    /// Cookie that makes the browser drop the session.
    pub fn clear(&self) -> String {
        self.render("", Some(0))
    }

    fn render(&self, value: &str, max_age: Option<u64>) -> String {
        let mut cookie = format!("{}={}; Path=/; HttpOnly", self.name, value);
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str("; SameSite=Strict");
        if let Some(max_age) = max_age {
            cookie.push_str(&format!("; Max-Age={}", max_age));
        }
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_secure_cookie() {
        let cookie = SessionCookie::new("session", true);
        assert_eq!(
            cookie.issue("abc"),
            "session=abc; Path=/; HttpOnly; Secure; SameSite=Strict"
        );
    }

    #[test]
    fn test_clear_cookie() {
        let cookie = SessionCookie::new("sid", false);
        assert_eq!(cookie.clear(), "sid=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
    }

    #[test]
    fn test_from_config() {
        let cookie = SessionCookie::from_config(&AuthConfig::default());
        assert_eq!(cookie.name(), "session");
        assert!(cookie.issue("k").contains("Secure"));
    }
}
