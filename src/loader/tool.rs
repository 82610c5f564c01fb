//! Locating and running external metadata tools.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::LoaderError;

const FALLBACK_DIRS: &[&str] = &["/usr/bin", "/bin"];

/// Search `PATH`, then the fallback directories, for an executable called `name`.
pub(crate) fn find_executable(name: &str) -> Option<PathBuf> {
    let path_dirs = std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).collect::<Vec<_>>())
        .unwrap_or_default();

    path_dirs
        .into_iter()
        .chain(FALLBACK_DIRS.iter().map(PathBuf::from))
        .flat_map(|dir| candidates(&dir, name))
        .find(|candidate| is_executable(candidate))
}

fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![dir.join(name), dir.join(format!("{name}.exe"))]
    } else {
        vec![dir.join(name)]
    }
}

#[cfg(unix)]
pub(crate) fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub(crate) fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Check a configured tool path the way every tool source does.
pub(crate) fn validate(tool: &str, path: Option<&Path>) -> Result<PathBuf, LoaderError> {
    let path = path
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| {
            LoaderError::Configuration(format!("missing 'path' for {tool} executable"))
        })?;
    if !is_executable(path) {
        return Err(LoaderError::Configuration(format!(
            "{} is not an executable {tool} binary",
            path.display()
        )));
    }
    Ok(path.to_path_buf())
}

/// Run `program` with `args` and return its stdout, lossily decoded.
pub(crate) fn run(program: &Path, args: &[&std::ffi::OsStr]) -> Result<String, LoaderError> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| LoaderError::Tool(format!("failed to run {}: {e}", program.display())))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(LoaderError::Tool(format!(
            "{} exited with {}: {}",
            program.display(),
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Split tool output into trimmed, non-blank lines, whatever the line endings.
pub(crate) fn report_lines(output: &str) -> impl Iterator<Item = &str> {
    output
        .split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
}

/// Write an executable shell script that prints `stdout`.
#[cfg(all(test, unix))]
pub(crate) fn fake_tool(dir: &Path, name: &str, stdout: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    let script = format!("#!/bin/sh\ncat <<'EOF'\n{stdout}\nEOF\n");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
