//! Fixtures shared by unit tests.

use crate::codebase::Codebase;
use crate::editor::Editor;
use crate::error::CodebaseCreationError;
use crate::repository::Repository;
use moe_kernel::Options;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    pub(crate) fn new(prefix: &str) -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "moe-engine-{prefix}-{}-{unique}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn write(&self, relative: &str, contents: &str) {
        let target = self.path.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).expect("parent dir should be created");
        }
        fs::write(target, contents).expect("fixture file should write");
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Repository over a fixed directory that counts its checkouts.
pub(crate) struct CountingRepository {
    pub(crate) name: String,
    pub(crate) project_space: String,
    pub(crate) root: PathBuf,
    pub(crate) checkouts: AtomicUsize,
}

impl CountingRepository {
    pub(crate) fn new(name: &str, project_space: &str, root: &Path) -> Self {
        Self {
            name: name.to_string(),
            project_space: project_space.to_string(),
            root: root.to_path_buf(),
            checkouts: AtomicUsize::new(0),
        }
    }

    pub(crate) fn checkouts(&self) -> usize {
        self.checkouts.load(Ordering::SeqCst)
    }
}

impl Repository for CountingRepository {
    fn name(&self) -> &str {
        &self.name
    }

    fn project_space(&self) -> &str {
        &self.project_space
    }

    fn check_out(&self, _options: &Options) -> Result<PathBuf, CodebaseCreationError> {
        self.checkouts.fetch_add(1, Ordering::SeqCst);
        Ok(self.root.clone())
    }
}

/// Editor that copies the input tree into a fresh directory and appends a
/// line to one file. Output dirs are kept alive by the editor.
pub(crate) struct AppendingEditor {
    pub(crate) name: String,
    pub(crate) file: String,
    pub(crate) line: String,
    pub(crate) outputs: parking_lot::Mutex<Vec<TempDirGuard>>,
}

impl AppendingEditor {
    pub(crate) fn new(name: &str, file: &str, line: &str) -> Self {
        Self {
            name: name.to_string(),
            file: file.to_string(),
            line: line.to_string(),
            outputs: parking_lot::Mutex::new(Vec::new()),
        }
    }
}

impl Editor for AppendingEditor {
    fn name(&self) -> &str {
        &self.name
    }

    fn edit(&self, input: &Codebase, options: &Options) -> Result<Codebase, CodebaseCreationError> {
        let out = TempDirGuard::new(&self.name);
        copy_tree(input.root(), out.path());
        let target = out.path().join(&self.file);
        let mut contents = fs::read_to_string(&target).unwrap_or_default();
        contents.push_str(&self.line);
        if let Some(suffix) = options.get("suffix") {
            contents.push_str(suffix);
        }
        contents.push('\n');
        fs::write(&target, contents).expect("edited file should write");
        let root = out.path().to_path_buf();
        self.outputs.lock().push(out);
        Ok(Codebase::new(root, input.project_space(), input.expression().clone()))
    }
}

/// Editor that copies the input tree verbatim into a fresh directory.
pub(crate) struct CopyingEditor {
    pub(crate) outputs: parking_lot::Mutex<Vec<TempDirGuard>>,
}

impl CopyingEditor {
    pub(crate) fn new() -> Self {
        Self {
            outputs: parking_lot::Mutex::new(Vec::new()),
        }
    }
}

impl Editor for CopyingEditor {
    fn name(&self) -> &str {
        "copy"
    }

    fn edit(&self, input: &Codebase, _options: &Options) -> Result<Codebase, CodebaseCreationError> {
        let out = TempDirGuard::new("copy");
        copy_tree(input.root(), out.path());
        let root = out.path().to_path_buf();
        self.outputs.lock().push(out);
        Ok(Codebase::new(root, input.project_space(), input.expression().clone()))
    }
}

pub(crate) fn copy_tree(from: &Path, to: &Path) {
    fs::create_dir_all(to).expect("copy target should be created");
    for entry in fs::read_dir(from).expect("copy source should list") {
        let entry = entry.expect("dir entry");
        let target = to.join(entry.file_name());
        if entry.file_type().expect("file type").is_dir() {
            copy_tree(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), target).expect("file should copy");
        }
    }
}
