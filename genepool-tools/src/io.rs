// SPDX-License-Identifier: AGPL-3.0-or-later
// GenePool - Partitioned k-NN Ensemble Classifier
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Dataset ingestion
//!
//! Reads comma-separated `label,f1,f2,...` records into a [`GeneStore`].
//!
//! Lines are read through a bounded reader: a line longer than
//! `max_line_bytes` is an error, never a silent truncation. Blank lines are
//! skipped. Line numbers in errors are 1-based and count the header.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use genepool_core::{DEFAULT_MAX_LINE_BYTES, GenePoolError, GeneStore, Result, RunConfig};
use tracing::{debug, info, warn};

const READ_BUFFER_BYTES: usize = 64 * 1024;

/// Ingestion settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    pub num_features: usize,
    pub max_line_bytes: usize,
    /// Skip the first line as an attribute header
    pub has_header: bool,
    /// Stop after this many records
    pub limit: Option<usize>,
}

impl IngestOptions {
    pub fn new(num_features: usize) -> Self {
        Self {
            num_features,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            has_header: false,
            limit: None,
        }
    }
}

impl From<&RunConfig> for IngestOptions {
    fn from(cfg: &RunConfig) -> Self {
        Self {
            num_features: cfg.num_features,
            max_line_bytes: cfg.max_line_bytes,
            has_header: cfg.has_header,
            limit: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineRead {
    Eof,
    Line,
    TooLong,
}

/// Read one line into `buf` without its terminator, refusing lines longer
/// than `max` bytes.
fn read_bounded_line<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max: usize,
) -> std::io::Result<LineRead> {
    buf.clear();
    loop {
        let (found, used) = {
            let available = reader.fill_buf()?;
            if available.is_empty() {
                return Ok(if buf.is_empty() {
                    LineRead::Eof
                } else {
                    LineRead::Line
                });
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    if buf.len() + pos > max {
                        return Ok(LineRead::TooLong);
                    }
                    buf.extend_from_slice(&available[..pos]);
                    (true, pos + 1)
                }
                None => {
                    if buf.len() + available.len() > max {
                        return Ok(LineRead::TooLong);
                    }
                    buf.extend_from_slice(available);
                    (false, available.len())
                }
            }
        };
        reader.consume(used);
        if found {
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
            return Ok(LineRead::Line);
        }
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .map_err(|e| GenePoolError::ingestion(path, 0, format!("cannot open file: {e}")))?;
    Ok(BufReader::with_capacity(READ_BUFFER_BYTES, file))
}

/// Ingest a CSV file into a new store.
pub fn ingest_csv(path: impl AsRef<Path>, opts: &IngestOptions) -> Result<GeneStore> {
    let path = path.as_ref();
    let store = ingest_reader(open(path)?, path, opts)?;
    info!(
        path = %path.display(),
        genes = store.len(),
        features = store.num_features(),
        labels = store.labels().len(),
        bytes = store.memory_usage(),
        "Ingested dataset"
    );
    Ok(store)
}

/// Ingest records from any buffered reader; `origin` names it in errors.
pub fn ingest_reader<R: BufRead>(
    mut reader: R,
    origin: &Path,
    opts: &IngestOptions,
) -> Result<GeneStore> {
    let mut store = GeneStore::new(opts.num_features)?;
    let mut buf = Vec::with_capacity(opts.max_line_bytes.min(READ_BUFFER_BYTES));
    let mut row = Vec::with_capacity(opts.num_features);
    let mut line_no = 0usize;

    let io_err = |line: usize, e: std::io::Error| GenePoolError::ingestion(origin, line, e.to_string());
    let too_long = |line: usize| {
        GenePoolError::ingestion(
            origin,
            line,
            format!("line exceeds {} bytes", opts.max_line_bytes),
        )
    };

    if opts.has_header {
        line_no += 1;
        match read_bounded_line(&mut reader, &mut buf, opts.max_line_bytes)
            .map_err(|e| io_err(line_no, e))?
        {
            LineRead::Eof => return Ok(store),
            LineRead::TooLong => return Err(too_long(line_no)),
            LineRead::Line => debug!(header_bytes = buf.len(), "Skipped attribute header"),
        }
    }

    loop {
        if opts.limit.is_some_and(|limit| store.len() >= limit) {
            break;
        }
        line_no += 1;
        match read_bounded_line(&mut reader, &mut buf, opts.max_line_bytes)
            .map_err(|e| io_err(line_no, e))?
        {
            LineRead::Eof => break,
            LineRead::TooLong => return Err(too_long(line_no)),
            LineRead::Line => {}
        }

        let text = std::str::from_utf8(&buf)
            .map_err(|_| GenePoolError::ingestion(origin, line_no, "line is not valid UTF-8"))?;
        if text.trim().is_empty() {
            continue;
        }

        let label = parse_record(text, opts.num_features, &mut row)
            .map_err(|reason| GenePoolError::ingestion(origin, line_no, reason))?;
        store.push(&row, label).inspect_err(|e| {
            if matches!(e, GenePoolError::LabelTooLong { .. }) {
                warn!(origin = %origin.display(), line = line_no, "Label too long");
            }
        })?;
    }

    Ok(store)
}

/// Split one record into its label and features.
fn parse_record<'a>(
    text: &'a str,
    num_features: usize,
    row: &mut Vec<f32>,
) -> std::result::Result<&'a str, String> {
    let mut fields = text.split(',');
    let label = fields.next().map(str::trim).unwrap_or_default();
    if label.is_empty() {
        return Err("missing label".to_string());
    }

    row.clear();
    for (i, field) in fields.enumerate() {
        if i == num_features {
            return Err(format!(
                "expected {num_features} features, found more"
            ));
        }
        let field = field.trim();
        let value = field
            .parse::<f32>()
            .map_err(|_| format!("feature {}: invalid number '{}'", i + 1, field))?;
        row.push(value);
    }
    if row.len() != num_features {
        return Err(format!(
            "expected {} features, found {}",
            num_features,
            row.len()
        ));
    }
    Ok(label)
}

/// Attribute names from the header line of `path`.
///
/// An empty file, or a first line with a single column, is an error.
pub fn read_attributes(path: impl AsRef<Path>, max_line_bytes: usize) -> Result<Vec<String>> {
    let path = path.as_ref();
    let mut reader = open(path)?;
    let mut buf = Vec::new();
    match read_bounded_line(&mut reader, &mut buf, max_line_bytes)
        .map_err(|e| GenePoolError::ingestion(path, 1, e.to_string()))?
    {
        LineRead::Eof => return Err(GenePoolError::ingestion(path, 1, "file is empty")),
        LineRead::TooLong => {
            return Err(GenePoolError::ingestion(
                path,
                1,
                format!("line exceeds {max_line_bytes} bytes"),
            ));
        }
        LineRead::Line => {}
    }

    let text = std::str::from_utf8(&buf)
        .map_err(|_| GenePoolError::ingestion(path, 1, "line is not valid UTF-8"))?;
    let attributes: Vec<String> = text.split(',').map(|a| a.trim().to_string()).collect();
    if attributes.len() < 2 {
        return Err(GenePoolError::ingestion(
            path,
            1,
            "expected at least two comma-separated attributes",
        ));
    }
    Ok(attributes)
}

/// Number of comma-separated attributes on the first line.
pub fn count_attributes(path: impl AsRef<Path>, max_line_bytes: usize) -> Result<usize> {
    read_attributes(path, max_line_bytes).map(|a| a.len())
}

/// Size of the header line in bytes, terminator included.
pub fn header_len(path: impl AsRef<Path>, max_line_bytes: usize) -> Result<usize> {
    let path = path.as_ref();
    // Room for a full-length line plus a CRLF terminator
    let mut bounded = open(path)?.take(max_line_bytes as u64 + 2);
    let mut buf = Vec::new();
    let n = bounded
        .read_until(b'\n', &mut buf)
        .map_err(|e| GenePoolError::ingestion(path, 1, e.to_string()))?;
    if n == 0 {
        return Err(GenePoolError::ingestion(path, 1, "file is empty"));
    }
    let content = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
    let content = content.strip_suffix(b"\r").unwrap_or(content);
    if content.len() > max_line_bytes {
        return Err(GenePoolError::ingestion(
            path,
            1,
            format!("line exceeds {max_line_bytes} bytes"),
        ));
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ingest(text: &str, opts: &IngestOptions) -> Result<GeneStore> {
        ingest_reader(Cursor::new(text.as_bytes()), Path::new("mem.csv"), opts)
    }

    #[test]
    fn test_bounded_line_reader() {
        let mut reader = BufReader::with_capacity(4, Cursor::new(b"abc\r\nlonger line\nz".as_ref()));
        let mut buf = Vec::new();

        assert_eq!(read_bounded_line(&mut reader, &mut buf, 8).unwrap(), LineRead::Line);
        assert_eq!(buf, b"abc");
        assert_eq!(read_bounded_line(&mut reader, &mut buf, 8).unwrap(), LineRead::TooLong);

        let mut reader = Cursor::new(b"z".as_ref());
        assert_eq!(read_bounded_line(&mut reader, &mut buf, 8).unwrap(), LineRead::Line);
        assert_eq!(buf, b"z");
        assert_eq!(read_bounded_line(&mut reader, &mut buf, 8).unwrap(), LineRead::Eof);
    }

    #[test]
    fn test_ingest_records() {
        let store = ingest("A,0,0\nA, 0, 1\n\nB,5,5.5\n", &IngestOptions::new(2)).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.features(1), Some(&[0.0f32, 1.0][..]));
        assert_eq!(store.get(2).unwrap().label, "B");
        assert_eq!(store.labels().len(), 2);
    }

    #[test]
    fn test_header_and_limit() {
        let opts = IngestOptions {
            has_header: true,
            limit: Some(2),
            ..IngestOptions::new(1)
        };
        let store = ingest("label,x\nA,1\nB,2\nC,3\n", &opts).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0).unwrap().label, "A");
    }

    #[test]
    fn test_malformed_records_report_line() {
        let opts = IngestOptions::new(2);
        let err = ingest("A,1,2\nB,1,x\n", &opts).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Ingestion error in mem.csv at line 2: feature 2: invalid number 'x'"
        );

        let err = ingest("A,1\n", &opts).unwrap_err();
        assert!(err.to_string().contains("expected 2 features, found 1"));

        let err = ingest("A,1,2,3\n", &opts).unwrap_err();
        assert!(err.to_string().contains("found more"));

        let err = ingest(",1,2\n", &opts).unwrap_err();
        assert!(err.to_string().contains("missing label"));

        let err = ingest("a-very-long-label-name,1,2\n", &opts).unwrap_err();
        assert_eq!(err.kind(), "label_too_long");
        assert!(matches!(err, GenePoolError::LabelTooLong { len: 22, .. }));
    }

    #[test]
    fn test_header_len_counts_crlf_at_bound() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crlf.csv");
        std::fs::write(&path, "abcd,efgh\r\nA,1\r\n").unwrap();

        assert_eq!(header_len(&path, 9).unwrap(), 11);
        assert_eq!(header_len(&path, 64).unwrap(), 11);
        assert!(header_len(&path, 8).is_err());

        std::fs::write(&path, "abcd,efgh\nA,1\n").unwrap();
        assert_eq!(header_len(&path, 9).unwrap(), 10);
    }

    #[test]
    fn test_overlong_line_rejected() {
        let opts = IngestOptions {
            max_line_bytes: 16,
            ..IngestOptions::new(3)
        };
        let long = format!("A,{}\n", vec!["1.000000"; 3].join(","));
        let err = ingest(&long, &opts).unwrap_err();
        assert!(err.to_string().contains("line 1: line exceeds 16 bytes"));
    }
}
