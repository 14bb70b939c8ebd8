//! File loader and saver ports.
//!
//! A loader or saver reports its progress through [`EventOut`]s. The
//! document routes those outputs into its own receivers, so it never
//! depends on how the bytes actually move. The `load_file` and `save_file`
//! helpers drive the ports with blocking `std::fs` I/O.

use std::cell::Cell;
use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use mgui_core::EventOut;
use mgui_core::logging::targets;

use crate::error::DocumentError;

const CHUNK_SIZE: usize = 64 * 1024;

fn io_error(path: &Path, error: &io::Error) -> DocumentError {
    DocumentError::Io {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

// ============================================================================
// Loader
// ============================================================================

/// Reads a file and reports it in chunks.
///
/// Ports, in the order they fire: `progress(total_bytes)` and `read(chunk)`
/// per chunk, then `completed()` or `error(err)`. `destroyed()` fires when
/// the loader is dropped.
pub struct FileLoader {
    path: PathBuf,
    total: Cell<u64>,
    finished: Cell<bool>,
    progress: EventOut<u64>,
    error: EventOut<DocumentError>,
    read: EventOut<Vec<u8>>,
    completed: EventOut<()>,
    destroyed: EventOut<()>,
}

impl FileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            total: Cell::new(0),
            finished: Cell::new(false),
            progress: EventOut::new(),
            error: EventOut::new(),
            read: EventOut::new(),
            completed: EventOut::new(),
            destroyed: EventOut::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes reported so far.
    pub fn bytes_read(&self) -> u64 {
        self.total.get()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }

    pub fn progress(&self) -> &EventOut<u64> {
        &self.progress
    }

    pub fn error(&self) -> &EventOut<DocumentError> {
        &self.error
    }

    pub fn read(&self) -> &EventOut<Vec<u8>> {
        &self.read
    }

    pub fn completed(&self) -> &EventOut<()> {
        &self.completed
    }

    pub fn destroyed(&self) -> &EventOut<()> {
        &self.destroyed
    }

    /// Report a chunk. Ignored once the loader has finished.
    pub fn feed(&self, chunk: &[u8]) {
        if self.finished.get() {
            return;
        }
        self.total.set(self.total.get() + chunk.len() as u64);
        self.progress.emit(self.total.get());
        self.read.emit(chunk.to_vec());
    }

    /// Report success.
    pub fn finish(&self) {
        if !self.finished.replace(true) {
            tracing::debug!(target: targets::DOCUMENT, path = %self.path.display(), bytes = self.total.get(), "load completed");
            self.completed.emit(());
        }
    }

    /// Report failure.
    pub fn fail(&self, error: DocumentError) {
        if !self.finished.replace(true) {
            tracing::debug!(target: targets::DOCUMENT, path = %self.path.display(), %error, "load failed");
            self.error.emit(error);
        }
    }

    /// Read the whole file from disk, driving the ports.
    pub fn load_file(&self) {
        match self.read_chunks() {
            Ok(()) => self.finish(),
            Err(err) => self.fail(io_error(&self.path, &err)),
        }
    }

    fn read_chunks(&self) -> io::Result<()> {
        let mut file = fs::File::open(&self.path)?;
        let mut buffer = vec![0; CHUNK_SIZE];
        loop {
            let n = file.read(&mut buffer)?;
            if n == 0 {
                return Ok(());
            }
            self.feed(&buffer[..n]);
        }
    }
}

impl Drop for FileLoader {
    fn drop(&mut self) {
        self.destroyed.emit(());
    }
}

impl fmt::Debug for FileLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileLoader")
            .field("path", &self.path)
            .field("bytes_read", &self.total.get())
            .field("finished", &self.finished.get())
            .finish()
    }
}

// ============================================================================
// Saver
// ============================================================================

/// Writes a file and reports its progress.
///
/// Ports: `progress(total_bytes)` and `written(chunk_len)` per chunk, then
/// `completed()` or `error(err)`. `destroyed()` fires when the saver is
/// dropped.
pub struct FileSaver {
    path: PathBuf,
    total: Cell<u64>,
    finished: Cell<bool>,
    progress: EventOut<u64>,
    error: EventOut<DocumentError>,
    written: EventOut<u64>,
    completed: EventOut<()>,
    destroyed: EventOut<()>,
}

impl FileSaver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            total: Cell::new(0),
            finished: Cell::new(false),
            progress: EventOut::new(),
            error: EventOut::new(),
            written: EventOut::new(),
            completed: EventOut::new(),
            destroyed: EventOut::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes_written(&self) -> u64 {
        self.total.get()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }

    pub fn progress(&self) -> &EventOut<u64> {
        &self.progress
    }

    pub fn error(&self) -> &EventOut<DocumentError> {
        &self.error
    }

    pub fn written(&self) -> &EventOut<u64> {
        &self.written
    }

    pub fn completed(&self) -> &EventOut<()> {
        &self.completed
    }

    pub fn destroyed(&self) -> &EventOut<()> {
        &self.destroyed
    }

    /// Report that `len` more bytes reached the file.
    pub fn record_written(&self, len: u64) {
        if self.finished.get() {
            return;
        }
        self.total.set(self.total.get() + len);
        self.progress.emit(self.total.get());
        self.written.emit(len);
    }

    pub fn finish(&self) {
        if !self.finished.replace(true) {
            tracing::debug!(target: targets::DOCUMENT, path = %self.path.display(), bytes = self.total.get(), "save completed");
            self.completed.emit(());
        }
    }

    pub fn fail(&self, error: DocumentError) {
        if !self.finished.replace(true) {
            tracing::debug!(target: targets::DOCUMENT, path = %self.path.display(), %error, "save failed");
            self.error.emit(error);
        }
    }

    /// Write `data` to disk, driving the ports.
    ///
    /// The data goes to a temporary file next to the target, which is then
    /// renamed over it, so a failed save leaves the old file intact.
    pub fn save_file(&self, data: &[u8]) {
        match self.write_atomic(data) {
            Ok(()) => self.finish(),
            Err(err) => self.fail(io_error(&self.path, &err)),
        }
    }

    fn write_atomic(&self, data: &[u8]) -> io::Result<()> {
        let mut temp = self.path.clone().into_os_string();
        temp.push(".saving");
        let temp = PathBuf::from(temp);

        let result = (|| {
            let mut file = fs::File::create(&temp)?;
            for chunk in data.chunks(CHUNK_SIZE) {
                file.write_all(chunk)?;
                self.record_written(chunk.len() as u64);
            }
            file.sync_all()?;
            fs::rename(&temp, &self.path)
        })();
        if result.is_err() {
            let _ = fs::remove_file(&temp);
        }
        result
    }
}

impl Drop for FileSaver {
    fn drop(&mut self) {
        self.destroyed.emit(());
    }
}

impl fmt::Debug for FileSaver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSaver")
            .field("path", &self.path)
            .field("bytes_written", &self.total.get())
            .field("finished", &self.finished.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use mgui_core::EventIn;

    use super::*;

    #[test]
    fn test_loader_reports_progress_then_completion() {
        let loader = FileLoader::new("notes.txt");
        let log = Rc::new(RefCell::new(Vec::new()));

        let progress_log = Rc::clone(&log);
        let progress = EventIn::new(move |total: &u64| progress_log.borrow_mut().push(format!("progress {total}")));
        let done_log = Rc::clone(&log);
        let done = EventIn::new(move |_: &()| done_log.borrow_mut().push("completed".to_string()));
        loader.progress().add_route(&progress);
        loader.completed().add_route(&done);

        loader.feed(b"abc");
        loader.feed(b"de");
        loader.finish();
        loader.feed(b"late");
        loader.finish();

        assert_eq!(*log.borrow(), ["progress 3", "progress 5", "completed"]);
        assert_eq!(loader.bytes_read(), 5);
    }

    #[test]
    fn test_fail_after_finish_is_ignored() {
        let saver = FileSaver::new("out.txt");
        let errors = Rc::new(Cell::new(0));
        let count = Rc::clone(&errors);
        let on_error = EventIn::new(move |_: &DocumentError| count.set(count.get() + 1));
        saver.error().add_route(&on_error);

        saver.finish();
        saver.fail(DocumentError::NoPath);
        assert_eq!(errors.get(), 0);
    }

    #[test]
    fn test_destroyed_on_drop() {
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        let on_destroyed = EventIn::new(move |_: &()| flag.set(true));
        {
            let loader = FileLoader::new("x");
            loader.destroyed().add_route(&on_destroyed);
        }
        assert!(fired.get());
        assert_eq!(on_destroyed.route_count(), 0);
    }

    #[test]
    fn test_missing_file_reports_io_error() {
        let loader = FileLoader::new("/nonexistent/mgui/missing.txt");
        let seen = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&seen);
        let on_error = EventIn::new(move |err: &DocumentError| *slot.borrow_mut() = Some(err.clone()));
        loader.error().add_route(&on_error);

        loader.load_file();
        assert!(matches!(&*seen.borrow(), Some(DocumentError::Io { path, .. }) if path.ends_with("missing.txt")));
    }

    #[test]
    fn test_save_then_load_file() {
        let path = std::env::temp_dir().join(format!("mgui-ports-{}.txt", std::process::id()));
        let saver = FileSaver::new(&path);
        saver.save_file(b"hello ports");
        assert!(saver.is_finished());
        assert_eq!(saver.bytes_written(), 11);

        let loader = FileLoader::new(&path);
        let contents = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&contents);
        let on_read = EventIn::new(move |chunk: &Vec<u8>| sink.borrow_mut().extend_from_slice(chunk));
        loader.read().add_route(&on_read);
        loader.load_file();

        assert_eq!(&*contents.borrow(), b"hello ports");
        let _ = fs::remove_file(&path);
    }
}
