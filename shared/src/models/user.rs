//! User Model (usuario)

use serde::{Deserialize, Serialize};

use crate::util::de_id;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    /// Floor staff (camarero / mesero)
    #[default]
    #[serde(rename = "camarero", alias = "mesero", alias = "attendant")]
    Attendant,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrador",
            Role::Attendant => "Camarero",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "camarero" | "mesero" | "attendant" => Ok(Role::Attendant),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: String,
    #[serde(rename = "rol", default)]
    pub role: Role,
    /// Soft-delete marker
    #[serde(rename = "activo", default = "default_active")]
    pub active: bool,
    #[serde(default, alias = "fecha_creacion", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Create user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "rol")]
    pub role: Role,
}

/// Update user payload (`PUT /usuarios/:id`), absent fields are left alone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "rol", skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}
