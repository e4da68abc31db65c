use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use stroop_core::{DataSink, SinkError};

#[derive(Serialize)]
struct Entry<'a> {
    key: &'a str,
    value: &'a str,
}

/// Appends one `{"key": .., "value": ..}` object per line and flushes after
/// every write, so a crash loses at most the record in flight.
pub struct JsonLinesSink {
    path: PathBuf,
    out: BufWriter<File>,
}

impl JsonLinesSink {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            out: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_entry(&mut self, key: &str, value: &str) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, &Entry { key, value })?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

impl DataSink for JsonLinesSink {
    fn set(&mut self, key: &str, value: &str) -> Result<(), SinkError> {
        self.write_entry(key, value).map_err(|source| SinkError::Io {
            key: key.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_json_object_per_line() {
        let path = std::env::temp_dir().join(format!("stroop-sink-{}.jsonl", std::process::id()));
        let _ = std::fs::remove_file(&path);
        {
            let mut sink = JsonLinesSink::open(&path).unwrap();
            sink.set("couldReadWordsA", "Yes").unwrap();
            sink.set("stroopA1", r#"{"rt":-1,"correct":false}"#).unwrap();
        }
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["key"], "couldReadWordsA");
        assert_eq!(lines[1]["value"], r#"{"rt":-1,"correct":false}"#);
        std::fs::remove_file(&path).unwrap();
    }
}
