use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity carried inside the token: `{"user": {"id": ...}}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserClaim {
    pub id: Uuid,
}

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user: UserClaim,
    pub iat: usize, // issued at (unix timestamp)
    pub exp: usize, // expires at (unix timestamp)
}
