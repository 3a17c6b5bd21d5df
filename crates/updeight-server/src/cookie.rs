//! Session id carried in a private (encrypted and authenticated) cookie.

use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies, Key};
use uuid::Uuid;

use crate::config::CookieConfig;

pub struct SessionCookie {
    name: String,
    secure: bool,
    key: Key,
}

impl SessionCookie {
    pub fn new(config: &CookieConfig, key: Key) -> Self {
        Self {
            name: config.name.clone(),
            secure: config.secure,
            key,
        }
    }

    /// The session id, if the request carries a cookie that decrypts
    /// and holds a UUID.
    pub fn session_id(&self, cookies: &Cookies) -> Option<Uuid> {
        cookies
            .private(&self.key)
            .get(&self.name)
            .and_then(|cookie| cookie.value().parse().ok())
    }

    pub fn set(&self, cookies: &Cookies, session_id: Uuid) {
        let cookie = Cookie::build((self.name.clone(), session_id.to_string()))
            .http_only(true)
            .path("/")
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build();
        cookies.private(&self.key).add(cookie);
    }

    pub fn clear(&self, cookies: &Cookies) {
        let cookie = Cookie::build((self.name.clone(), String::new()))
            .path("/")
            .build();
        cookies.private(&self.key).remove(cookie);
    }
}
