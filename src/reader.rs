//! Buffered reader wrapper, for plain or gzip compressed navigation files.
use std::{
    fs::File,
    io::{BufRead, BufReader, Read, Result as IoResult},
    path::Path,
};

#[cfg(feature = "flate2")]
use flate2::read::GzDecoder;

// RINEX is \n termination based and made of short lines (80 columns),
// this is more than enough.
const BUF_SIZE: usize = 4096;

/// [BufferedReader] provides [BufRead] over local files,
/// whether they are gzip compressed or not.
pub enum BufferedReader {
    /// Readable (plain) file
    PlainFile(BufReader<File>),
    /// gzip compressed file
    #[cfg(feature = "flate2")]
    GzFile(BufReader<GzDecoder<File>>),
}

impl BufferedReader {
    /// Opens `path`. Files terminated by ".gz" are decompressed on the fly
    /// when the `flate2` feature is enabled.
    pub fn new(path: &Path) -> IoResult<Self> {
        let fd = File::open(path)?;
        #[cfg(feature = "flate2")]
        {
            if path.extension().map(|ext| ext == "gz").unwrap_or(false) {
                return Ok(Self::GzFile(BufReader::with_capacity(
                    BUF_SIZE,
                    GzDecoder::new(fd),
                )));
            }
        }
        Ok(Self::PlainFile(BufReader::with_capacity(BUF_SIZE, fd)))
    }
}

impl Read for BufferedReader {
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        match self {
            Self::PlainFile(h) => h.read(buf),
            #[cfg(feature = "flate2")]
            Self::GzFile(h) => h.read(buf),
        }
    }
}

impl BufRead for BufferedReader {
    fn fill_buf(&mut self) -> IoResult<&[u8]> {
        match self {
            Self::PlainFile(bufreader) => bufreader.fill_buf(),
            #[cfg(feature = "flate2")]
            Self::GzFile(bufreader) => bufreader.fill_buf(),
        }
    }
    fn consume(&mut self, s: usize) {
        match self {
            Self::PlainFile(bufreader) => bufreader.consume(s),
            #[cfg(feature = "flate2")]
            Self::GzFile(bufreader) => bufreader.consume(s),
        }
    }
}
