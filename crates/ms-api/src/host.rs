use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File-system collaborator of an installation.
///
/// Source paths address the mod's own tree, target paths the game
/// installation. Both arrive normalized with `/` separators and never climb
/// above their root.
pub trait InstallHost {
    fn source_exists(&self, path: &str) -> io::Result<bool>;
    fn source_dir_exists(&self, path: &str) -> io::Result<bool>;
    fn target_exists(&self, path: &str) -> io::Result<bool>;
    fn install_file(&mut self, source: &str, target: &str) -> io::Result<()>;
    fn move_file(&mut self, source: &str, target: &str) -> io::Result<()>;
    fn delete_target(&mut self, path: &str) -> io::Result<()>;
    fn create_target_dir(&mut self, path: &str) -> io::Result<()>;
    /// `None` when the file does not exist yet.
    fn read_target(&self, path: &str) -> io::Result<Option<String>>;
    fn write_target(&mut self, path: &str, contents: &str) -> io::Result<()>;
    fn game_version(&self) -> io::Result<String>;
}

/// `InstallHost` over two real directories.
#[derive(Debug, Clone)]
pub struct DirectoryHost {
    mod_root: PathBuf,
    install_root: PathBuf,
    game_version: String,
}

impl DirectoryHost {
    pub fn new(
        mod_root: impl Into<PathBuf>,
        install_root: impl Into<PathBuf>,
        game_version: impl Into<String>,
    ) -> Self {
        Self {
            mod_root: mod_root.into(),
            install_root: install_root.into(),
            game_version: game_version.into(),
        }
    }

    fn source(&self, path: &str) -> PathBuf {
        join(&self.mod_root, path)
    }

    fn target(&self, path: &str) -> PathBuf {
        join(&self.install_root, path)
    }
}

fn join(root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |path, part| path.join(part))
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent),
        None => Ok(()),
    }
}

impl InstallHost for DirectoryHost {
    fn source_exists(&self, path: &str) -> io::Result<bool> {
        Ok(self.source(path).is_file())
    }

    fn source_dir_exists(&self, path: &str) -> io::Result<bool> {
        Ok(self.source(path).is_dir())
    }

    fn target_exists(&self, path: &str) -> io::Result<bool> {
        Ok(self.target(path).exists())
    }

    fn install_file(&mut self, source: &str, target: &str) -> io::Result<()> {
        let destination = self.target(target);
        ensure_parent(&destination)?;
        fs::copy(self.source(source), destination).map(|_| ())
    }

    fn move_file(&mut self, source: &str, target: &str) -> io::Result<()> {
        let from = self.source(source);
        let destination = self.target(target);
        ensure_parent(&destination)?;
        // Rename fails across devices; fall back to copy and delete.
        if fs::rename(&from, &destination).is_err() {
            fs::copy(&from, &destination)?;
            fs::remove_file(&from)?;
        }
        Ok(())
    }

    fn delete_target(&mut self, path: &str) -> io::Result<()> {
        fs::remove_file(self.target(path))
    }

    fn create_target_dir(&mut self, path: &str) -> io::Result<()> {
        fs::create_dir_all(self.target(path))
    }

    fn read_target(&self, path: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.target(path)) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn write_target(&mut self, path: &str, contents: &str) -> io::Result<()> {
        let destination = self.target(path);
        ensure_parent(&destination)?;
        fs::write(destination, contents)
    }

    fn game_version(&self) -> io::Result<String> {
        Ok(self.game_version.clone())
    }
}
