//! CSV dialect, byte-order mark, and output encoding for the export file.
//!
//! The export dialect is comma-delimited with minimal quoting. Embedded quotes
//! are doubled (`""`), so any RFC 4180 reader handles them. Backslash is the
//! escape character: a literal backslash is written as `\\` and its field is
//! always quoted, since the reader only honours escapes inside quotes.
//! UTF-8 output starts with a byte-order mark; other encodings are transcoded
//! through `encoding_rs` and carry no signature.

use std::{
    borrow::Cow,
    fs::{self, File},
    io::{self, BufWriter, Cursor, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

pub const EXPORT_DELIMITER: u8 = b',';
pub const EXPORT_ESCAPE: u8 = b'\\';
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub type ExportWriter = csv::Writer<Box<dyn Write>>;

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

/// Creates `path` and returns a writer speaking the export dialect.
pub fn open_export_writer(path: &Path, encoding: &'static Encoding) -> Result<ExportWriter> {
    let mut base: Box<dyn Write> = Box::new(BufWriter::new(
        File::create(path).with_context(|| format!("Creating output file {path:?}"))?,
    ));

    let writer: Box<dyn Write> = if encoding == UTF_8 {
        base.write_all(UTF8_BOM)
            .with_context(|| format!("Writing byte-order mark to {path:?}"))?;
        base
    } else {
        Box::new(TranscodingWriter::new(base, encoding))
    };

    Ok(export_writer_builder().from_writer(writer))
}

fn export_writer_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(EXPORT_DELIMITER)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true)
        // The writer never emits comments; a comment byte only forces quoting.
        .comment(Some(EXPORT_ESCAPE));
    builder
}

/// Doubles backslashes; the csv writer only escapes the quote byte.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains('\\') {
        Cow::Owned(value.replace('\\', "\\\\"))
    } else {
        Cow::Borrowed(value)
    }
}

pub fn write_row<I, S>(writer: &mut ExportWriter, fields: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let escaped = fields
        .into_iter()
        .map(|field| escape_field(field.as_ref()).into_owned())
        .collect::<Vec<_>>();
    writer.write_record(&escaped)?;
    Ok(())
}

/// Opens an exported UTF-8 file for reading back with the export dialect.
pub fn open_export_reader(path: &Path) -> Result<csv::Reader<Cursor<Vec<u8>>>> {
    let mut bytes = fs::read(path).with_context(|| format!("Opening export file {path:?}"))?;
    if bytes.starts_with(UTF8_BOM) {
        bytes.drain(..UTF8_BOM.len());
    }
    Ok(export_reader_from(Cursor::new(bytes)))
}

pub fn export_reader_from<R: io::Read>(reader: R) -> csv::Reader<R> {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(EXPORT_DELIMITER)
        .double_quote(true)
        .escape(Some(EXPORT_ESCAPE))
        .flexible(false);
    builder.from_reader(reader)
}

struct TranscodingWriter<W: Write> {
    inner: W,
    encoding: &'static Encoding,
    buffer: Vec<u8>,
}

impl<W: Write> TranscodingWriter<W> {
    fn new(inner: W, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            encoding,
            buffer: Vec::new(),
        }
    }

    /// Encodes the longest valid UTF-8 prefix of the buffer. A trailing
    /// partial sequence stays buffered unless `force` is set.
    fn flush_buffer(&mut self, force: bool) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let valid_up_to = match std::str::from_utf8(&self.buffer) {
            Ok(_) => self.buffer.len(),
            Err(err) => {
                if err.error_len().is_some() {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "Invalid UTF-8 sequence in output stream",
                    ));
                }
                if force {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "Incomplete UTF-8 sequence at end of output stream",
                    ));
                }
                err.valid_up_to()
            }
        };
        if valid_up_to == 0 {
            return Ok(());
        }
        let text = std::str::from_utf8(&self.buffer[..valid_up_to])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
            .to_owned();
        self.encode_and_write(&text)?;
        self.buffer.drain(..valid_up_to);
        Ok(())
    }

    fn encode_and_write(&mut self, text: &str) -> io::Result<()> {
        let (encoded, _output_encoding, had_errors) = self.encoding.encode(text);
        if had_errors {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Failed to encode text using {}", self.encoding.name()),
            ));
        }
        self.inner.write_all(encoded.as_ref())
    }
}

impl<W: Write> Write for TranscodingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        self.flush_buffer(false)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_buffer(true)?;
        self.inner.flush()
    }
}
