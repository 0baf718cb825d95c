//! Normalized I/O: input sources, output sinks, and the destination handle
//! owned by the reordering sink.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::constants::{DEFAULT_OUTPUT_SUFFIX, PARTIAL_SUFFIX};

/// Canonical input abstraction
pub enum InputSource {
    Reader(Box<dyn Read + Send>),
    File(PathBuf),
    Memory(Vec<u8>),
}

/// Canonical output abstraction
pub enum OutputSink {
    Writer(Box<dyn Write + Send>),
    File(PathBuf),
    Memory,
}

/// Normalize an input source into a buffered reader.
pub fn open_input(src: InputSource, buffer: usize) -> io::Result<Box<dyn BufRead + Send>> {
    let reader: Box<dyn BufRead + Send> = match src {
        InputSource::Reader(r) => Box::new(BufReader::with_capacity(buffer, r)),
        InputSource::File(p) => Box::new(BufReader::with_capacity(buffer, File::open(p)?)),
        InputSource::Memory(b) => Box::new(Cursor::new(b)),
    };
    Ok(reader)
}

/// Normalize an output sink into a destination handle.
pub fn open_output(sink: OutputSink) -> io::Result<Destination<'static>> {
    match sink {
        OutputSink::Writer(w) => Ok(Destination::Writer(w)),
        OutputSink::File(p) => Destination::file(p),
        OutputSink::Memory => Ok(Destination::Memory(Vec::new())),
    }
}

/// Destination path used when none is given: the source path plus a fixed suffix.
pub fn default_output_path(source: &Path) -> PathBuf {
    with_suffix(source, DEFAULT_OUTPUT_SUFFIX)
}

/// In-progress path for a file destination.
pub fn partial_path(target: &Path) -> PathBuf {
    with_suffix(target, PARTIAL_SUFFIX)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// What remains of a destination after it was closed.
#[derive(Debug, Default)]
pub struct Finalized {
    /// Captured bytes of an in-memory destination.
    pub output: Option<Vec<u8>>,
    /// Unfinalized file left behind by a cancelled run.
    pub partial_path: Option<PathBuf>,
}

/// Destination stream, owned exclusively by the reordering sink.
///
/// File destinations are written to `<target>.part` and renamed onto the
/// target only by [`Destination::commit`].
pub enum Destination<'a> {
    Writer(Box<dyn Write + Send + 'a>),
    File {
        file: BufWriter<File>,
        part: PathBuf,
        target: PathBuf,
    },
    Memory(Vec<u8>),
}

impl<'a> Destination<'a> {
    pub fn file(target: PathBuf) -> io::Result<Self> {
        let part = partial_path(&target);
        let file = BufWriter::new(File::create(&part)?);
        debug!(part = %part.display(), "opened destination");
        Ok(Destination::File { file, part, target })
    }

    pub fn writer<W: Write + Send + 'a>(w: W) -> Self {
        Destination::Writer(Box::new(w))
    }

    pub fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Destination::Writer(w) => w.write_all(buf),
            Destination::File { file, .. } => file.write_all(buf),
            Destination::Memory(v) => {
                v.extend_from_slice(buf);
                Ok(())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Destination::Writer(w) => w.flush(),
            Destination::File { file, .. } => file.flush(),
            Destination::Memory(_) => Ok(()),
        }
    }

    /// Successful end: flush and publish.
    ///
    /// On failure a file destination's part file is removed before the
    /// error is returned.
    pub fn commit(mut self) -> io::Result<Finalized> {
        if let Err(e) = self.flush() {
            self.abort();
            return Err(e);
        }
        match self {
            Destination::Writer(_) => Ok(Finalized::default()),
            Destination::File { file, part, target } => {
                if let Err(e) = publish(file, &part, &target) {
                    remove_partial(&part);
                    return Err(e);
                }
                debug!(target = %target.display(), "destination finalized");
                Ok(Finalized::default())
            }
            Destination::Memory(v) => Ok(Finalized { output: Some(v), partial_path: None }),
        }
    }

    /// Cancelled end: flush the committed prefix and leave it marked as partial.
    ///
    /// If the prefix cannot be flushed the part file is removed instead.
    pub fn keep_partial(mut self) -> io::Result<Finalized> {
        if let Err(e) = self.flush() {
            self.abort();
            return Err(e);
        }
        match self {
            Destination::Writer(_) => Ok(Finalized::default()),
            Destination::File { part, .. } => {
                warn!(part = %part.display(), "partial output kept");
                Ok(Finalized { output: None, partial_path: Some(part) })
            }
            Destination::Memory(v) => Ok(Finalized { output: Some(v), partial_path: None }),
        }
    }

    /// Fatal end: close without finalizing, removing any partial file.
    pub fn abort(self) {
        if let Destination::File { file, part, .. } = self {
            drop(file);
            remove_partial(&part);
        }
    }
}

fn publish(file: BufWriter<File>, part: &Path, target: &Path) -> io::Result<()> {
    let file = file.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    drop(file);
    fs::rename(part, target)
}

fn remove_partial(part: &Path) {
    match fs::remove_file(part) {
        Ok(()) => debug!(part = %part.display(), "partial output removed"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(part = %part.display(), error = %e, "could not remove partial output"),
    }
}
