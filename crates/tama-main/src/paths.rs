use std::ffi::OsString;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "tama";

pub fn resolve_conf_dir(conf_dir: Option<&Path>) -> PathBuf {
    conf_dir.map(resolve_path_arg).unwrap_or_else(|| {
        xdg_app_dir(std::env::var_os("XDG_CONFIG_HOME"), &home_dir(), ".config")
    })
}

pub fn default_state_dir() -> PathBuf {
    xdg_app_dir(std::env::var_os("XDG_STATE_HOME"), &home_dir(), ".local/state")
}

pub fn default_data_dir() -> PathBuf {
    xdg_app_dir(std::env::var_os("XDG_DATA_HOME"), &home_dir(), ".local/share")
}

/// `$VAR/tama` when the variable holds an absolute path, otherwise
/// `<home>/<fallback>/tama`.
fn xdg_app_dir(var: Option<OsString>, home: &Path, fallback: &str) -> PathBuf {
    var.map(PathBuf::from)
        .filter(|path| path.is_absolute())
        .unwrap_or_else(|| home.join(fallback))
        .join(APP_DIR_NAME)
}

pub fn resolve_path_arg(path: &Path) -> PathBuf {
    let expanded = expand_path_with_home(path);
    if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(expanded)
    }
}

fn expand_path_with_home(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    if raw == "~" {
        return home_dir();
    }
    if let Some(suffix) = raw.strip_prefix("~/") {
        return home_dir().join(suffix);
    }
    path.to_path_buf()
}

fn home_dir() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home);
    }
    if let Some(profile) = std::env::var_os("USERPROFILE") {
        return PathBuf::from(profile);
    }
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_conf_dir_uses_absolute_override_directly() {
        let path = resolve_conf_dir(Some(Path::new("/tmp/tama-conf")));
        assert_eq!(path, PathBuf::from("/tmp/tama-conf"));
    }

    #[test]
    fn xdg_variable_wins_when_absolute() {
        let path = xdg_app_dir(
            Some(OsString::from("/xdg/config")),
            Path::new("/home/u"),
            ".config",
        );
        assert_eq!(path, PathBuf::from("/xdg/config/tama"));
    }

    #[test]
    fn relative_or_missing_xdg_variable_falls_back_to_home() {
        let home = Path::new("/home/u");
        assert_eq!(
            xdg_app_dir(None, home, ".local/share"),
            PathBuf::from("/home/u/.local/share/tama")
        );
        assert_eq!(
            xdg_app_dir(Some(OsString::from("relative")), home, ".local/state"),
            PathBuf::from("/home/u/.local/state/tama")
        );
    }
}
