//! Atomic JSON writers.
//!
//! Output goes to `<path>.working.<host>` first and is renamed over
//! the destination only after a successful finish, so a crashed worker
//! never leaves a truncated output in place.
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use bzip2::write::BzEncoder;
use flate2::write::GzEncoder;
use log::debug;
use serde::Serialize;

use super::host;
use crate::error::Error;

/// Holds the different kinds of sinks.
enum SinkKind {
    Stdout(io::Stdout),
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
    Bzip(BzEncoder<BufWriter<File>>),
}

impl Write for SinkKind {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            SinkKind::Stdout(w) => w.write(buf),
            SinkKind::Plain(w) => w.write(buf),
            SinkKind::Gzip(w) => w.write(buf),
            SinkKind::Bzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            SinkKind::Stdout(w) => w.flush(),
            SinkKind::Plain(w) => w.flush(),
            SinkKind::Gzip(w) => w.flush(),
            SinkKind::Bzip(w) => w.flush(),
        }
    }
}

impl SinkKind {
    /// Finalize the stream (codec trailers included).
    fn finish(self) -> io::Result<()> {
        match self {
            SinkKind::Stdout(mut w) => w.flush(),
            SinkKind::Plain(mut w) => w.flush(),
            SinkKind::Gzip(w) => w.finish()?.flush(),
            SinkKind::Bzip(w) => w.finish()?.flush(),
        }
    }
}

fn open_sink(path: &Path) -> Result<SinkKind, Error> {
    let file = BufWriter::new(File::create(path)?);
    Ok(match path_codec(path) {
        Codec::Gzip => SinkKind::Gzip(GzEncoder::new(file, flate2::Compression::default())),
        Codec::Bzip => SinkKind::Bzip(BzEncoder::new(file, bzip2::Compression::default())),
        Codec::Plain => SinkKind::Plain(file),
    })
}

enum Codec {
    Plain,
    Gzip,
    Bzip,
}

fn path_codec(path: &Path) -> Codec {
    // the working suffix hides the real extension
    let full = path.to_string_lossy();
    let name = match full.find(".working.") {
        Some(pos) => &full[..pos],
        None => &full[..],
    };
    if name.ends_with(".bz2") {
        Codec::Bzip
    } else if name.ends_with(".gz") {
        Codec::Gzip
    } else {
        Codec::Plain
    }
}

/// The working-file path for `dst` on this host.
pub fn working_path(dst: &Path) -> PathBuf {
    PathBuf::from(format!("{}.working.{}", dst.display(), host()))
}

/// JSON-lines writer with temp-then-rename atomicity.
pub struct JsonlWriter {
    sink: Option<SinkKind>,
    working: Option<PathBuf>,
    dst: PathBuf,
}

impl JsonlWriter {
    /// Create a writer for `dst`; `-` writes to stdout without the
    /// rename dance.
    pub fn create(dst: &Path) -> Result<Self, Error> {
        if dst == Path::new("-") {
            return Ok(Self {
                sink: Some(SinkKind::Stdout(io::stdout())),
                working: None,
                dst: dst.to_path_buf(),
            });
        }

        let working = working_path(dst);
        debug!("writing to {:?}", working);
        Ok(Self {
            sink: Some(open_sink(&working)?),
            working: Some(working),
            dst: dst.to_path_buf(),
        })
    }

    pub fn write_record<T: Serialize>(&mut self, record: &T) -> Result<(), Error> {
        let sink = self
            .sink
            .as_mut()
            .ok_or_else(|| Error::Custom("writer already finished".to_string()))?;
        serde_json::to_writer(&mut *sink, record)?;
        sink.write_all(b"\n")?;
        Ok(())
    }

    /// Finalize the stream and move it into place.
    pub fn finish(mut self) -> Result<(), Error> {
        if let Some(sink) = self.sink.take() {
            sink.finish()?;
        }
        if let Some(working) = self.working.take() {
            fs::rename(&working, &self.dst)?;
        }
        Ok(())
    }
}

impl Drop for JsonlWriter {
    fn drop(&mut self) {
        // an unfinished writer leaves its working file behind for
        // inspection; nothing to clean up here
        if let Some(working) = &self.working {
            if self.sink.is_some() {
                debug!("writer dropped unfinished, keeping {:?}", working);
            }
        }
    }
}

/// Write one JSON value to `dst` atomically (single line, like the
/// stats and diagnostics files).
pub fn write_json_atomic<T: Serialize>(dst: &Path, value: &T) -> Result<(), Error> {
    if dst == Path::new("-") {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        serde_json::to_writer(&mut lock, value)?;
        lock.write_all(b"\n")?;
        return Ok(());
    }

    let working = working_path(dst);
    {
        let mut file = BufWriter::new(File::create(&working)?);
        serde_json::to_writer(&mut file, value)?;
        file.write_all(b"\n")?;
        file.flush()?;
    }
    fs::rename(&working, dst)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::io::JsonLines;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Row {
        id: String,
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("impresso-lid-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_rename_only_on_finish() {
        let dir = scratch_dir("atomic");
        let dst = dir.join("out.jsonl");

        let mut writer = JsonlWriter::create(&dst).unwrap();
        writer
            .write_record(&Row {
                id: "a".to_string(),
            })
            .unwrap();
        assert!(!dst.exists());
        writer.finish().unwrap();
        assert!(dst.exists());

        let rows: Vec<Row> = JsonLines::open(&dst).unwrap().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 1);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_bz2_output_reads_back() {
        let dir = scratch_dir("bz2");
        let dst = dir.join("out.jsonl.bz2");

        let mut writer = JsonlWriter::create(&dst).unwrap();
        for id in ["a", "b"] {
            writer.write_record(&Row { id: id.to_string() }).unwrap();
        }
        writer.finish().unwrap();

        let rows: Vec<Row> = JsonLines::open(&dst).unwrap().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows[1].id, "b");
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_working_suffix_does_not_change_codec() {
        assert!(matches!(
            path_codec(Path::new("x.jsonl.bz2.working.host")),
            Codec::Bzip
        ));
        assert!(matches!(path_codec(Path::new("x.jsonl")), Codec::Plain));
        assert!(matches!(path_codec(Path::new("x.jsonl.gz")), Codec::Gzip));
    }

    #[test]
    fn test_write_json_atomic() {
        let dir = scratch_dir("json");
        let dst = dir.join("stats.json");
        write_json_atomic(&dst, &Row { id: "s".to_string() }).unwrap();
        let body = fs::read_to_string(&dst).unwrap();
        assert_eq!(body.trim(), r#"{"id":"s"}"#);
        fs::remove_dir_all(dir).unwrap();
    }
}
