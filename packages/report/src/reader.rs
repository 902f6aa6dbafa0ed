//! Report export file reader.
//!
//! Exports are CSV (optionally gzip-compressed) with a one-line report title
//! above the header row and one or more `Total` summary rows at the bottom.
//! [`ReportReader`] strips both and returns the header and data rows as
//! text; typing happens in [`crate::decode`].

use std::borrow::Cow;
use std::io::Read;
use std::path::Path;
use std::str::FromStr as _;

use adreport_report_models::ReportType;

/// Leading bytes of a gzip stream.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Errors raised while reading export files.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// I/O error (file read or decompression).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// The file has no header row after the title lines.
    #[error("Report file contains no header row")]
    MissingHeader,
}

/// Header and data rows of one export.
#[derive(Debug, Clone, Default)]
pub struct ReportFile {
    /// First title line, if any were skipped.
    pub title: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Number of `Total` rows dropped from the end.
    pub summary_rows: usize,
}

impl ReportFile {
    /// Report type named at the start of the title line
    /// (`CAMPAIGN_PERFORMANCE_REPORT (May 1, 2013)`).
    #[must_use]
    pub fn title_report_type(&self) -> Option<ReportType> {
        let title = self.title.as_deref()?;
        let name = title
            .trim_matches(|c: char| c == '"' || c.is_whitespace())
            .split(|c: char| c.is_whitespace() || c == '(' || c == ',')
            .next()?;
        ReportType::from_str(name).ok()
    }
}

/// Reader for report export files.
#[derive(Debug, Clone)]
pub struct ReportReader {
    /// Field delimiter byte (defaults to `,`).
    delimiter: u8,
    /// Lines above the header row (defaults to 1).
    title_lines: usize,
}

impl Default for ReportReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportReader {
    /// Creates a reader for comma-delimited exports with one title line.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: b',',
            title_lines: 1,
        }
    }

    /// Sets the field delimiter (e.g. `b'\t'` for TSV exports).
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets how many lines precede the header row.
    #[must_use]
    pub const fn with_title_lines(mut self, title_lines: usize) -> Self {
        self.title_lines = title_lines;
        self
    }

    /// Reads an export from disk. Gzip input is detected from its magic
    /// bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError`] if the file cannot be read or parsed.
    pub fn read_path(&self, path: &Path) -> Result<ReportFile, ReaderError> {
        let file = std::fs::File::open(path)?;
        let report = self.read(file)?;

        log::info!(
            "Read {} rows from {} ({} summary rows dropped)",
            report.rows.len(),
            path.display(),
            report.summary_rows,
        );

        Ok(report)
    }

    /// Reads an export from any byte source.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError`] if the input cannot be read or parsed.
    pub fn read<R: Read>(&self, mut input: R) -> Result<ReportFile, ReaderError> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;

        // ── Decompress if needed ────────────────────────────────────────
        if bytes.starts_with(&GZIP_MAGIC) {
            let mut decoder = flate2::read::GzDecoder::new(bytes.as_slice());
            let mut decompressed = Vec::new();
            decoder.read_to_end(&mut decompressed)?;
            log::debug!("Decompressed {} -> {} bytes", bytes.len(), decompressed.len());
            bytes = decompressed;
        }

        // ── Title lines ─────────────────────────────────────────────────
        let mut body = bytes.as_slice();
        let mut title = None;
        for _ in 0..self.title_lines {
            let end = body.iter().position(|b| *b == b'\n').map_or(body.len(), |i| i + 1);
            let line = String::from_utf8_lossy(&body[..end]).trim().to_owned();
            if title.is_none() && !line.is_empty() {
                title = Some(line);
            }
            body = &body[end..];
        }

        // ── Parse CSV ───────────────────────────────────────────────────
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(body);

        let mut records = reader.byte_records();

        let headers: Vec<String> = match records.next() {
            Some(header) => lossy_cells(&header?, 0)
                .iter()
                .map(|h| h.trim().trim_start_matches('\u{feff}').to_owned())
                .collect(),
            None => return Err(ReaderError::MissingHeader),
        };

        if headers.iter().all(String::is_empty) {
            return Err(ReaderError::MissingHeader);
        }

        let mut rows = Vec::new();
        let mut summary_rows = 0;

        for (i, result) in records.enumerate() {
            let record = lossy_cells(&result?, i + 1);

            if record
                .first()
                .is_some_and(|first| first.trim().eq_ignore_ascii_case("total"))
            {
                summary_rows += 1;
                continue;
            }
            if summary_rows > 0 {
                log::warn!("Ignoring row after the report totals");
                continue;
            }

            rows.push(record);
        }

        Ok(ReportFile {
            title,
            headers,
            rows,
            summary_rows,
        })
    }
}

/// Cells of `record` as text. Invalid UTF-8 is replaced with U+FFFD rather
/// than failing the file.
fn lossy_cells(record: &csv::ByteRecord, record_index: usize) -> Vec<String> {
    record
        .iter()
        .map(|cell| match String::from_utf8_lossy(cell) {
            Cow::Borrowed(text) => text.to_owned(),
            Cow::Owned(text) => {
                log::debug!("Replaced invalid UTF-8 in CSV record {record_index}: {text:?}");
                text
            }
        })
        .collect()
}
