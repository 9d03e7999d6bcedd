use std::env;

/// Which rule set the handlers enforce. `Strict` adds the server-side
/// tier/accommodation compatibility check; `Lenient` reproduces the legacy
/// behavior where that table was only enforced by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Strict,
    Lenient,
}

/// Runtime configuration, loaded once at startup and shared via `web::Data`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Deployment policy toggle: whether POST /room-types and
    /// DELETE /room-types/{id} are enabled at all.
    pub room_type_writes_enabled: bool,
    pub validation_mode: ValidationMode,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let room_type_writes_enabled = env::var("ROOM_TYPE_WRITES_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);
        let validation_mode = match env::var("VALIDATION_MODE").as_deref() {
            Ok("lenient") => ValidationMode::Lenient,
            _ => ValidationMode::Strict,
        };
        let bind_addr =
            env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        AppConfig {
            room_type_writes_enabled,
            validation_mode,
            bind_addr,
        }
    }

    pub fn strict(&self) -> bool {
        self.validation_mode == ValidationMode::Strict
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            room_type_writes_enabled: true,
            validation_mode: ValidationMode::Strict,
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }
}
