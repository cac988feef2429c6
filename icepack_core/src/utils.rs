use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

pub const PRIVATE_FILE_MODE: u32 = 0o600;

/// Mask a secret for display, keeping only a short prefix.
pub fn mask_str(s: &str) -> String {
    if s.chars().count() <= 8 {
        "*".repeat(s.chars().count())
    } else {
        let prefix: String = s.chars().take(8).collect();
        format!("{}...", prefix)
    }
}

fn set_permissions(path: &Path, mode: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(mode);
        fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    {
        let _ = (path, mode);
    }
    Ok(())
}

/// Atomically write `content` to `path` with owner-only permissions.
///
/// Missing parent directories are created; existing ones are left as they are.
pub fn write_private_text(path: &Path, content: &str, mode: u32) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.exists() {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(
            "{}.",
            path.file_name().unwrap_or_default().to_string_lossy()
        ))
        .tempfile_in(parent)?;
    let _ = set_permissions(tmp.path(), mode);
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    let _ = tmp.as_file().sync_all();
    tmp.persist(path).map_err(|e| e.error)?;
    let _ = set_permissions(path, mode);
    Ok(())
}

pub fn write_private_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    let payload = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
        + "\n";
    write_private_text(path, &payload, PRIVATE_FILE_MODE)
}
