//! Delimited-text reader for simulator outputs, plain or gzip-compressed.

use crate::error::{Error, Result};
use crate::fetch::{HttpClient, fetch_bytes};
use crate::input::Location;
use csv::ReaderBuilder;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A CSV reader over any decoded byte source.
pub type DelimitedReader = csv::Reader<Box<dyn Read>>;

/// Opens `location` as a delimited table with a header row.
///
/// Remote files are downloaded in full through `client`. Gzip is detected
/// from the content, the delimiter from the file name (`.tsv` means tab).
/// The returned reader owns the file handle, so it is closed whenever the
/// reader is dropped, including after a failed read.
#[tracing::instrument(skip(location, client), fields(location = %location))]
pub fn open_delimited<C: HttpClient + ?Sized>(
    location: &Location,
    client: &C,
) -> Result<DelimitedReader> {
    let delimiter = delimiter_for(location.file_name().unwrap_or_default());

    let source: Box<dyn Read> = match location {
        Location::Local(path) => match File::open(path) {
            Ok(file) => Box::new(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::missing_file(location));
            }
            Err(e) => return Err(e.into()),
        },
        Location::Remote(url) => Box::new(Cursor::new(fetch_bytes(client, url)?)),
    };

    reader_from(source, delimiter)
}

/// Wraps an arbitrary source, decoding gzip when the magic bytes are present.
pub fn reader_from<R: Read + 'static>(source: R, delimiter: u8) -> Result<DelimitedReader> {
    let mut buffered = BufReader::new(source);
    let is_gzip = buffered.fill_buf()?.starts_with(&GZIP_MAGIC);
    debug!(is_gzip, delimiter = %(delimiter as char), "Opening delimited source");

    let decoded: Box<dyn Read> = if is_gzip {
        Box::new(MultiGzDecoder::new(buffered))
    } else {
        Box::new(buffered)
    };

    Ok(ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(decoded))
}

/// Tab for `.tsv` / `.tsv.gz`, comma for everything else.
pub fn delimiter_for(file_name: &str) -> u8 {
    let name = file_name.strip_suffix(".gz").unwrap_or(file_name);
    if name.ends_with(".tsv") { b'\t' } else { b',' }
}
