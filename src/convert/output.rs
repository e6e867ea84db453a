use std::{
    fs::{self, File, Permissions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{ConvertError, Result};

/// Output file that only appears at `target` once committed.
///
/// Writes go to a temporary sibling of the file `target` names (following
/// symlinks); `commit` renames it into place with the mode a plain create or
/// overwrite would have left. Dropping without committing removes the
/// temporary file and leaves whatever was at `target` untouched.
pub struct StagedOutput {
    target: PathBuf,
    dest: PathBuf,
    keep_mode: Option<Permissions>,
    writer: BufWriter<NamedTempFile>,
}

impl StagedOutput {
    pub fn create<P: AsRef<Path>>(target: P) -> Result<Self> {
        let target = target.as_ref().to_path_buf();
        let dest = resolve_link(&target).map_err(|e| ConvertError::io(&target, e))?;
        let keep_mode = fs::metadata(&dest).ok().map(|m| m.permissions());

        let dir = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut builder = tempfile::Builder::new();
        builder.prefix(".csvinsert-").suffix(".sql.tmp");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // same request as File::create, so the umask applies
            builder.permissions(Permissions::from_mode(0o666));
        }
        let tmp = builder
            .tempfile_in(&dir)
            .map_err(|e| ConvertError::io(&target, e))?;

        debug!(
            tmp = %tmp.path().display(),
            dest = %dest.display(),
            "staging output"
        );
        Ok(Self {
            target,
            dest,
            keep_mode,
            writer: BufWriter::new(tmp),
        })
    }

    /// The path the caller asked for.
    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn writer(&mut self) -> &mut impl Write {
        &mut self.writer
    }

    /// Flush and move the staged file over the destination.
    pub fn commit(self) -> Result<File> {
        let target = self.target;
        let tmp = self
            .writer
            .into_inner()
            .map_err(|e| ConvertError::io(&target, e.into_error()))?;
        if let Some(perms) = self.keep_mode {
            tmp.as_file()
                .set_permissions(perms)
                .map_err(|e| ConvertError::io(&target, e))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|e| ConvertError::io(&target, e))?;
        tmp.persist(&self.dest)
            .map_err(|e| ConvertError::io(&target, e.error))
    }
}

/// Follow symlinks at `path` so the file they point to gets replaced, not the link.
/// A dangling link resolves to the path it names.
fn resolve_link(path: &Path) -> io::Result<PathBuf> {
    let mut current = path.to_path_buf();
    for _ in 0..40 {
        match fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => {
                let next = fs::read_link(&current)?;
                current = match current.parent() {
                    Some(parent) if next.is_relative() => parent.join(next),
                    _ => next,
                };
            }
            _ => return Ok(current),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::Other,
        format!("too many levels of symbolic links at {}", path.display()),
    ))
}
