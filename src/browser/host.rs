//! Host environment probing
//!
//! Firefox provisioning needs to know whether it runs on Android (e.g. Termux),
//! where geckodriver must be handed to the driver by absolute path.

use crate::error::{BrowserError, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Operating system identification as reported by `uname -o`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOs {
    /// Android userland
    Android,
    /// Any other OS, with the reported name
    Other(String),
}

impl HostOs {
    /// Identifier `uname -o` prints on Android
    pub const ANDROID_ID: &'static str = "Android";

    /// Classify a `uname -o` output line
    pub fn from_uname(output: &str) -> Self {
        let name = output.trim();
        if name == Self::ANDROID_ID {
            HostOs::Android
        } else {
            HostOs::Other(name.to_string())
        }
    }

    /// Detect the host OS
    #[cfg(unix)]
    pub async fn detect() -> Result<Self> {
        Self::detect_with("uname").await
    }

    /// Run `<program> -o` and classify its output
    #[cfg_attr(not(unix), allow(dead_code))]
    pub(crate) async fn detect_with(program: &str) -> Result<Self> {
        let output = tokio::process::Command::new(program)
            .arg("-o")
            .output()
            .await
            .map_err(|e| {
                BrowserError::HostDetection(format!("failed to run {} -o: {}", program, e))
            })?;

        if !output.status.success() {
            return Err(BrowserError::HostDetection(format!(
                "{} -o exited with {}",
                program, output.status
            ))
            .into());
        }

        let host = Self::from_uname(&String::from_utf8_lossy(&output.stdout));
        debug!("Detected host OS: {:?}", host);
        Ok(host)
    }

    /// Detect the host OS
    #[cfg(not(unix))]
    pub async fn detect() -> Result<Self> {
        Ok(HostOs::Other(env::consts::OS.to_string()))
    }

    /// Whether this is Android
    pub fn is_android(&self) -> bool {
        matches!(self, HostOs::Android)
    }
}

/// Search every `PATH` directory for an executable named `name`
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    find_executable_in(name, env::split_paths(&paths))
}

pub(crate) fn find_executable_in<I>(name: &str, dirs: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    dirs.into_iter()
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;

    #[test]
    fn test_from_uname() {
        assert_eq!(HostOs::from_uname("Android\n"), HostOs::Android);
        assert_eq!(
            HostOs::from_uname("GNU/Linux\n"),
            HostOs::Other("GNU/Linux".to_string())
        );
        assert!(!HostOs::from_uname("Darwin").is_android());
    }

    #[tokio::test]
    async fn test_detect_missing_program() {
        let err = HostOs::detect_with("/nonexistent/selestium/uname")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Browser(BrowserError::HostDetection(ref msg)) if msg.contains("failed to run")
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_detect_nonzero_exit() {
        // `false` ignores its arguments and exits 1
        let err = HostOs::detect_with("false").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Browser(BrowserError::HostDetection(ref msg)) if msg.contains("exited with")
        ));
    }

    #[test]
    fn test_find_executable_missing() {
        let dir = env::temp_dir().join("selestium-host-empty");
        fs::create_dir_all(&dir).unwrap();
        assert!(find_executable_in("no-such-driver", vec![dir]).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_find_executable_requires_exec_bit() {
        use std::os::unix::fs::PermissionsExt;

        let plain = env::temp_dir().join(format!("selestium-host-plain-{}", std::process::id()));
        let exec = env::temp_dir().join(format!("selestium-host-exec-{}", std::process::id()));
        fs::create_dir_all(&plain).unwrap();
        fs::create_dir_all(&exec).unwrap();

        let not_exec = plain.join("fakedriver");
        fs::write(&not_exec, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&not_exec, fs::Permissions::from_mode(0o644)).unwrap();

        let is_exec = exec.join("fakedriver");
        fs::write(&is_exec, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&is_exec, fs::Permissions::from_mode(0o755)).unwrap();

        let found = find_executable_in("fakedriver", vec![plain.clone(), exec.clone()]);
        assert_eq!(found, Some(is_exec));

        assert!(find_executable_in("fakedriver", vec![plain]).is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_detect_on_unix() {
        // uname exists on every unix CI image
        let host = HostOs::detect().await.unwrap();
        if let HostOs::Other(name) = host {
            assert!(!name.is_empty());
        }
    }
}
