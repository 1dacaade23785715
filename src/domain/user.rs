use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// Registration body of `POST /users/`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
}

/// Form body of `POST /token`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Public view of a user; the password hash never leaves the service.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserOut {
    pub id: i64,
    pub username: String,
}

impl From<User> for UserOut {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}
