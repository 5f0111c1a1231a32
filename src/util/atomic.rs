// ============================================================================
// src/util/atomic.rs – Durable, permissioned atomic writes (key + config)
// ============================================================================

use anyhow::{bail, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

/// Return the parent directory path or error with context.
fn parent_dir(path: &Path) -> Result<PathBuf> {
    match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Ok(PathBuf::from(".")),
        Some(p) => Ok(p.to_path_buf()),
        None => bail!("Target path has no parent directory: {}", path.display()),
    }
}

/// Fsync a directory to persist metadata (like rename).
fn fsync_dir(dir: &Path) -> Result<()> {
    let f = File::open(dir).with_context(|| format!("Open dir for fsync: {dir:?}"))?;
    f.sync_all()
        .with_context(|| format!("Fsync dir failed: {dir:?}"))?;
    Ok(())
}

/// Reject writes if target is a symlink.
fn reject_symlink_target(path: &Path) -> Result<()> {
    if let Ok(meta) = fs::symlink_metadata(path) {
        if meta.file_type().is_symlink() {
            bail!("Refusing to write to symlink: {}", path.display());
        }
    }
    Ok(())
}

/// Pick an unused sibling name for the staging file.
fn staging_path(dir: &Path, file_name: &str) -> PathBuf {
    let mut tmp = dir.join(format!("{file_name}.tmp-{}", nanoid::nanoid!(8)));
    for _ in 0..8 {
        if !tmp.exists() {
            break;
        }
        tmp = dir.join(format!("{file_name}.tmp-{}", nanoid::nanoid!(8)));
    }
    tmp
}

/// Writes bytes to a temp file in the same directory, fsyncs it, renames
/// into place, then fsyncs the parent directory. Applies the exact POSIX
/// mode regardless of umask.
pub fn atomic_write_bytes(path: &Path, bytes: &[u8], mode: u32, force: bool) -> Result<()> {
    reject_symlink_target(path)?;

    let dir = parent_dir(path)?;
    if !dir.exists() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Create parent directory failed: {dir:?}"))?;
    }

    if !force && path.exists() {
        bail!(
            "File already exists (use --force to overwrite): {}",
            path.display()
        );
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("Target path missing file name")?;
    let tmp = staging_path(&dir, &file_name);

    let mut f = OpenOptions::new()
        .create_new(true)
        .write(true)
        .mode(mode)
        .open(&tmp)
        .with_context(|| format!("Open temp file failed: {tmp:?}"))?;

    let written = f
        .write_all(bytes)
        .context("Write to temp file failed")
        .and_then(|_| f.sync_all().context("Fsync temp file failed"));
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }

    fs::rename(&tmp, path).with_context(|| {
        format!(
            "Atomic rename failed ({} -> {})",
            tmp.display(),
            path.display()
        )
    })?;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("Set permissions failed for {}", path.display()))?;

    fsync_dir(&dir)?;

    Ok(())
}

/// Atomic write of TOML-serializable config with 0600 permissions.
pub fn atomic_write_toml<T: serde::Serialize>(path: &Path, value: &T, force: bool) -> Result<()> {
    let s = toml::to_string_pretty(value).context("Serialize TOML failed")?;
    atomic_write_bytes(path, s.as_bytes(), 0o600, force)
}

/// Atomic write of derived key material with 0400 permissions.
pub fn atomic_write_key(path: &Path, key: &[u8], force: bool) -> Result<()> {
    atomic_write_bytes(path, key, 0o400, force)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn key_file_gets_owner_read_only_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("derived.key");
        atomic_write_key(&path, b"\x01\x02\x03", false).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"\x01\x02\x03");
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o400);
    }

    #[test]
    fn refuses_to_clobber_without_force() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("forge.toml");
        fs::write(&path, "old").unwrap();

        assert!(atomic_write_bytes(&path, b"new", 0o600, false).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");

        atomic_write_bytes(&path, b"new", 0o600, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn refuses_symlink_target() {
        let dir = tempdir().unwrap();
        let real = dir.path().join("real");
        let link = dir.path().join("link");
        fs::write(&real, "x").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let err = atomic_write_bytes(&link, b"y", 0o600, true).unwrap_err();
        assert!(err.to_string().contains("symlink"));
    }

    #[test]
    fn leaves_no_staging_files_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("cfg.toml");
        atomic_write_toml(&path, &crate::config::Config::default(), false).unwrap();

        let names: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("cfg.toml")]);
    }
}
