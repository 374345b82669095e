//! Directory operations: enumeration, move, permissions, zip/unzip.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::config::{Config, DEFAULT_ZIP_LEVEL};
use crate::error::{Error, Result};
use crate::file::FileSnapshot;

/// Permission changes applied by [`DirectoryOps::set_access_control`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessControl {
    pub read_only: bool,
    /// Unix mode bits; ignored on other platforms.
    pub mode: Option<u32>,
}

pub trait DirectoryOps {
    /// Create (or reuse) a direct child directory named `name`.
    fn create_subdirectory(&self, name: &str) -> Result<Directory>;

    /// Files directly inside, keyed by name, sorted.
    fn sub_file_data(&self) -> Result<IndexMap<String, FileSnapshot>>;

    /// Directories directly inside, keyed by name, sorted.
    fn sub_directory_data(&self) -> Result<IndexMap<String, FileSnapshot>>;

    /// Move the tree to `destination` and return the relocated directory.
    fn move_to(&mut self, destination: &Path) -> Result<Directory>;

    fn set_access_control(&self, access: &AccessControl) -> Result<()>;

    /// Archive the whole tree into `destination`. Returns the entry count.
    fn zip(&self, destination: &Path) -> Result<usize>;

    /// Extract `zip_path` into this directory. Returns the entry count.
    fn unzip(&self, zip_path: &Path) -> Result<usize>;

    fn special_folders(&self) -> Vec<PathBuf> {
        special_folders()
    }
}

/// A directory on the host filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    path: PathBuf,
    zip_level: i64,
}

impl Directory {
    /// Wrap an existing directory.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_dir() {
            return Err(Error::NotFound(path.display().to_string()));
        }
        Ok(Directory {
            path,
            zip_level: DEFAULT_ZIP_LEVEL,
        })
    }

    /// Create the directory (and parents) if needed.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        fs::create_dir_all(&path)?;
        Self::open(path)
    }

    /// Wrap an existing directory using the configured archive settings.
    pub fn open_configured(path: impl Into<PathBuf>, config: &Config) -> Result<Self> {
        Ok(Self::open(path)?.with_compression_level(config.zip_compression_level))
    }

    pub fn with_compression_level(mut self, level: i64) -> Self {
        self.zip_level = level.clamp(0, 9);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> FileSnapshot {
        FileSnapshot::new(&self.path)
    }

    fn entries_where<P>(&self, keep: P) -> Result<IndexMap<String, FileSnapshot>>
    where
        P: Fn(&FileSnapshot) -> bool,
    {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            let snapshot = FileSnapshot::new(entry.path());
            if keep(&snapshot) {
                entries.push((entry.file_name().to_string_lossy().into_owned(), snapshot));
            }
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries.into_iter().collect())
    }
}

impl DirectoryOps for Directory {
    fn create_subdirectory(&self, name: &str) -> Result<Directory> {
        validate_name(name)?;
        let path = self.path.join(name);
        fs::create_dir_all(&path)?;
        log::debug!("Created subdirectory {}", path.display());
        Ok(Directory {
            path,
            zip_level: self.zip_level,
        })
    }

    fn sub_file_data(&self) -> Result<IndexMap<String, FileSnapshot>> {
        self.entries_where(FileSnapshot::is_file)
    }

    fn sub_directory_data(&self) -> Result<IndexMap<String, FileSnapshot>> {
        self.entries_where(FileSnapshot::is_dir)
    }

    fn move_to(&mut self, destination: &Path) -> Result<Directory> {
        if destination.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", destination.display()),
            )
            .into());
        }
        match fs::rename(&self.path, destination) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                log::info!(
                    "{} and {} are on different devices, copying",
                    self.path.display(),
                    destination.display()
                );
                if let Err(e) = copy_tree(&self.path, destination) {
                    if let Err(cleanup) = fs::remove_dir_all(destination) {
                        log::warn!(
                            "Failed to remove partial copy at {}: {cleanup}",
                            destination.display()
                        );
                    }
                    return Err(e);
                }
                fs::remove_dir_all(&self.path)?;
            }
            Err(e) => return Err(e.into()),
        }
        self.path = destination.to_path_buf();
        Ok(self.clone())
    }

    fn set_access_control(&self, access: &AccessControl) -> Result<()> {
        let mut perms = fs::metadata(&self.path)?.permissions();
        apply_permissions(&mut perms, access);
        fs::set_permissions(&self.path, perms)?;
        Ok(())
    }

    fn zip(&self, destination: &Path) -> Result<usize> {
        let destination = std::path::absolute(destination)?;
        let source = std::path::absolute(&self.path)?;
        if destination.starts_with(&source) {
            return Err(Error::InvalidName(format!(
                "archive {} would be written inside {}",
                destination.display(),
                source.display()
            )));
        }

        let mut writer = ZipWriter::new(File::create(&destination)?);
        // Deflate rejects level 0; that level means no compression.
        let options = if self.zip_level == 0 {
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
        } else {
            SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(self.zip_level))
        };

        let mut count = 0;
        for entry in WalkDir::new(&source).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            let name = entry_name(&source, entry.path());
            if entry.file_type().is_dir() {
                writer.add_directory(name, options)?;
            } else if entry.file_type().is_file() {
                writer.start_file(name, options)?;
                let mut input = File::open(entry.path())?;
                io::copy(&mut input, &mut writer)?;
            } else {
                log::debug!("Skipping {} (not a regular file)", entry.path().display());
                continue;
            }
            count += 1;
        }
        writer.finish()?;
        log::info!("Zipped {count} entries into {}", destination.display());
        Ok(count)
    }

    fn unzip(&self, zip_path: &Path) -> Result<usize> {
        let mut archive = ZipArchive::new(File::open(zip_path)?)?;
        let count = archive.len();
        archive.extract(&self.path)?;
        log::info!("Extracted {count} entries into {}", self.path.display());
        Ok(count)
    }
}

/// Well-known per-user directories that exist on this machine.
pub fn special_folders() -> Vec<PathBuf> {
    let candidates = [
        dirs::home_dir(),
        dirs::desktop_dir(),
        dirs::document_dir(),
        dirs::download_dir(),
        dirs::config_dir(),
        dirs::data_dir(),
        dirs::cache_dir(),
        dirs::picture_dir(),
        dirs::audio_dir(),
        dirs::video_dir(),
    ];
    let mut folders: Vec<PathBuf> = Vec::new();
    for dir in candidates.into_iter().flatten() {
        if dir.is_dir() && !folders.contains(&dir) {
            folders.push(dir);
        }
    }
    folders
}

fn validate_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\');
    if bad {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Archive entry name: path relative to `base`, `/`-separated.
fn entry_name(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn copy_tree(source: &Path, destination: &Path) -> Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry?;
        let rel = entry.path().strip_prefix(source).unwrap_or(entry.path());
        let target = destination.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn apply_permissions(perms: &mut fs::Permissions, access: &AccessControl) {
    use std::os::unix::fs::PermissionsExt;

    let mut mode = access.mode.unwrap_or_else(|| perms.mode());
    if access.read_only {
        mode &= !0o222;
    } else if access.mode.is_none() {
        mode |= 0o200;
    }
    perms.set_mode(mode);
}

#[cfg(not(unix))]
fn apply_permissions(perms: &mut fs::Permissions, access: &AccessControl) {
    if access.mode.is_some() {
        log::warn!("Mode bits are not supported on this platform; only read-only is applied");
    }
    perms.set_readonly(access.read_only);
}
