// Operator authentication (single admin account, in-memory sessions)
pub mod session;

pub use session::*;

/// Operator credentials checked by `POST /api/login`
#[derive(Clone, Debug)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl AdminCredentials {
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}
