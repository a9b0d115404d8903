//! Client-related types shared between the backend contract and the client
//!
//! Auth request/response DTOs.

use serde::{Deserialize, Serialize};

use crate::models::Role;
use crate::util::de_id;

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "usuario", alias = "user")]
    pub user: UserInfo,
}

/// Authenticated user information, persisted with the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(rename = "nombre", alias = "name")]
    pub name: String,
    pub email: String,
    #[serde(rename = "rol", alias = "role", default)]
    pub role: Role,
}

impl UserInfo {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
