//! Filesystem locations used by the daemon.
//!
//! The socket lives in the per-user runtime directory:
//! - `$XDG_RUNTIME_DIR/glod.sock` when the runtime dir is known
//! - `/var/run/user/<uid>/glod.sock` otherwise

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the daemon socket.
const SOCKET_FILE: &str = "glod.sock";

/// Returns the per-user runtime directory.
pub fn runtime_dir() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(|| PathBuf::from(format!("/var/run/user/{}", nix::unistd::getuid())))
}

/// Returns the default socket path: `<runtime dir>/glod.sock`
pub fn default_socket_path() -> PathBuf {
    runtime_dir().join(SOCKET_FILE)
}

/// Creates the directory that will hold `socket_path` if it doesn't exist.
pub fn ensure_socket_dir(socket_path: &Path) -> Result<()> {
    match socket_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create socket directory: {}", dir.display())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_os = "linux")]
    #[test]
    #[serial_test::serial]
    fn test_default_socket_path_uses_xdg_runtime_dir() {
        let previous = std::env::var_os("XDG_RUNTIME_DIR");
        std::env::set_var("XDG_RUNTIME_DIR", "/run/user/4242");

        assert_eq!(
            default_socket_path(),
            PathBuf::from("/run/user/4242/glod.sock")
        );

        match previous {
            Some(value) => std::env::set_var("XDG_RUNTIME_DIR", value),
            None => std::env::remove_var("XDG_RUNTIME_DIR"),
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    #[serial_test::serial]
    fn test_default_socket_path_falls_back_to_uid_dir() {
        let previous = std::env::var_os("XDG_RUNTIME_DIR");
        std::env::remove_var("XDG_RUNTIME_DIR");

        let expected = format!("/var/run/user/{}/glod.sock", nix::unistd::getuid());
        assert_eq!(default_socket_path(), PathBuf::from(expected));

        if let Some(value) = previous {
            std::env::set_var("XDG_RUNTIME_DIR", value);
        }
    }

    #[test]
    fn test_ensure_socket_dir_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("a").join("b").join("glod.sock");

        ensure_socket_dir(&socket).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
        assert!(!socket.exists());
    }

    #[test]
    fn test_ensure_socket_dir_bare_file_name() {
        ensure_socket_dir(Path::new("glod.sock")).unwrap();
    }
}
