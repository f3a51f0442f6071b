use anyhow::{Result, anyhow};
use std::{env, path::PathBuf};

/// Directory holding ghops configuration.
///
/// `$XDG_CONFIG_HOME/ghops`, falling back to `$HOME/.config/ghops`.
pub fn ghops_home() -> Result<PathBuf> {
    let base = match env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        Some(xdg) => PathBuf::from(xdg),
        None => env::var_os("HOME")
            .filter(|v| !v.is_empty())
            .map(|h| PathBuf::from(h).join(".config"))
            .ok_or_else(|| anyhow!("cannot locate config directory: neither XDG_CONFIG_HOME nor HOME is set"))?,
    };
    Ok(base.join("ghops"))
}

pub fn config_file() -> Result<PathBuf> {
    Ok(ghops_home()?.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    struct EnvGuard(Vec<(&'static str, Option<std::ffi::OsString>)>);

    impl EnvGuard {
        fn set(vars: &[(&'static str, Option<&str>)]) -> Self {
            let saved = vars.iter().map(|(k, _)| (*k, env::var_os(k))).collect();
            for (k, v) in vars {
                // SAFETY: tests touching the environment run under #[serial].
                unsafe {
                    match v {
                        Some(v) => env::set_var(k, v),
                        None => env::remove_var(k),
                    }
                }
            }
            Self(saved)
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (k, v) in &self.0 {
                // SAFETY: see EnvGuard::set.
                unsafe {
                    match v {
                        Some(v) => env::set_var(k, v),
                        None => env::remove_var(k),
                    }
                }
            }
        }
    }

    #[test]
    #[serial]
    fn prefers_xdg_config_home() {
        let _g = EnvGuard::set(&[("XDG_CONFIG_HOME", Some("/tmp/xdg")), ("HOME", Some("/home/u"))]);
        assert_eq!(ghops_home().unwrap(), PathBuf::from("/tmp/xdg/ghops"));
        assert_eq!(
            config_file().unwrap(),
            PathBuf::from("/tmp/xdg/ghops/config.toml")
        );
    }

    #[test]
    #[serial]
    fn falls_back_to_home_config() {
        let _g = EnvGuard::set(&[("XDG_CONFIG_HOME", None), ("HOME", Some("/home/u"))]);
        assert_eq!(ghops_home().unwrap(), PathBuf::from("/home/u/.config/ghops"));
    }

    #[test]
    #[serial]
    fn errors_without_any_base() {
        let _g = EnvGuard::set(&[("XDG_CONFIG_HOME", None), ("HOME", None)]);
        assert!(ghops_home().is_err());
    }
}
