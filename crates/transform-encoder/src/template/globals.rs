//! Placeholders that do not come from the record.

use std::path::MAIN_SEPARATOR;

/// Value of a global placeholder, `None` when `key` is not one or has no value.
pub(crate) fn lookup(key: &str) -> Option<String> {
    if let Some(name) = key.strip_prefix("env.") {
        return std::env::var(name).ok();
    }
    match key {
        "system.os" => Some(std::env::consts::OS.to_string()),
        "system.arch" => Some(std::env::consts::ARCH.to_string()),
        "system.slash" => Some(MAIN_SEPARATOR.to_string()),
        "system.wd" => std::env::current_dir()
            .ok()
            .map(|dir| dir.display().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_variable() {
        std::env::set_var("TRANSFORM_ENCODER_TEST_VAR", "on");
        assert_eq!(lookup("env.TRANSFORM_ENCODER_TEST_VAR").as_deref(), Some("on"));
        std::env::remove_var("TRANSFORM_ENCODER_TEST_VAR");
        assert_eq!(lookup("env.TRANSFORM_ENCODER_TEST_VAR"), None);
    }

    #[test]
    fn test_system_values() {
        assert_eq!(lookup("system.os").as_deref(), Some(std::env::consts::OS));
        assert_eq!(lookup("system.arch").as_deref(), Some(std::env::consts::ARCH));
        assert_eq!(lookup("system.slash"), Some(MAIN_SEPARATOR.to_string()));
        assert!(lookup("system.wd").is_some());
    }

    #[test]
    fn test_not_global() {
        assert_eq!(lookup("msg"), None);
        assert_eq!(lookup("request>method"), None);
        assert_eq!(lookup("system.nope"), None);
    }
}
