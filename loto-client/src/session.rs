// loto-client/src/session.rs
// 会话存储 - JSON 文件

use serde::{Deserialize, Serialize};
use shared::client::{LoginResponse, UserInfo};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Session file name inside the data directory
pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Authenticated session: bearer token plus the logged-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserInfo,
    /// Login time (Unix millis)
    pub logged_in_at: i64,
}

impl Session {
    pub fn new(token: impl Into<String>, user: UserInfo) -> Self {
        Self {
            token: token.into(),
            user,
            logged_in_at: shared::util::now_millis(),
        }
    }

    pub fn from_login(login: LoginResponse) -> Self {
        Self::new(login.token, login.user)
    }

    /// JWT `exp` claim (Unix seconds), if the token is a JWT that carries one
    pub fn expires_at(&self) -> Option<u64> {
        parse_jwt_exp(&self.token)
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at() {
            Some(exp) => {
                let now = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs();
                now > exp
            }
            None => false,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }
}

/// 从 JWT token 中解析过期时间 (Unix timestamp)
pub fn parse_jwt_exp(token: &str) -> Option<u64> {
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

    // header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    let payload_bytes = URL_SAFE_NO_PAD.decode(parts[1].trim_end_matches('=')).ok()?;
    let payload: serde_json::Value = serde_json::from_slice(&payload_bytes).ok()?;
    payload.get("exp")?.as_u64()
}

/// On-disk shape. Both keys are optional so a half-written file is ignored
/// instead of failing startup.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<UserInfo>,
    #[serde(default)]
    logged_in_at: i64,
}

/// Persistent session storage
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store at `{data_dir}/session.json`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: data_dir.into().join(SESSION_FILE),
        }
    }

    /// 确保目录存在
    fn ensure_dir(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Persist the session
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        self.ensure_dir()?;
        let file = SessionFile {
            token: Some(session.token.clone()),
            user: Some(session.user.clone()),
            logged_in_at: session.logged_in_at,
        };
        fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        tracing::debug!(path = %self.path.display(), user = %session.user.email, "Session saved");
        Ok(())
    }

    /// Rehydrate the session.
    ///
    /// Returns `None` unless both token and user are stored. An expired JWT is
    /// discarded and the file removed.
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let file: SessionFile = match serde_json::from_str(&content) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Unreadable session file, ignoring");
                return Ok(None);
            }
        };

        let (Some(token), Some(user)) = (file.token, file.user) else {
            return Ok(None);
        };

        let session = Session {
            token,
            user,
            logged_in_at: file.logged_in_at,
        };

        if session.is_expired() {
            tracing::info!(user = %session.user.email, "Stored session expired, clearing");
            self.clear()?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Remove everything persisted (logout)
    pub fn clear(&self) -> Result<(), SessionError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
