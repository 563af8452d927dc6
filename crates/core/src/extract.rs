//! Archive extraction.
//!
//! The format is inferred from the file name first and from the leading magic
//! bytes when the extension is not recognized. Archives are unpacked in place:
//! a failure part-way through leaves whatever was already written.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::progress::{ProgressHandler, bytes_progress_bar};
use crate::{Error, Result};

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// Uncompressed tarball.
    Tar,
    /// gzip-compressed tarball.
    TarGz,
    /// bzip2-compressed tarball.
    TarBz2,
    /// xz-compressed tarball.
    TarXz,
    /// zip archive.
    Zip,
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Tar => "tar",
            Self::TarGz => "tar.gz",
            Self::TarBz2 => "tar.bz2",
            Self::TarXz => "tar.xz",
            Self::Zip => "zip",
        };
        write!(f, "{s}")
    }
}

impl ArchiveFormat {
    /// Infer the format from a file name.
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        let has = |exts: &[&str]| exts.iter().any(|ext| name.ends_with(ext));

        if has(&[".tar.bz2", ".tbz2", ".tbz"]) {
            Some(Self::TarBz2)
        } else if has(&[".tar.gz", ".tgz"]) {
            Some(Self::TarGz)
        } else if has(&[".tar.xz", ".txz"]) {
            Some(Self::TarXz)
        } else if has(&[".tar"]) {
            Some(Self::Tar)
        } else if has(&[".zip"]) {
            Some(Self::Zip)
        } else {
            None
        }
    }

    /// Infer the format from the first bytes of a file.
    #[must_use]
    pub fn from_magic(header: &[u8]) -> Option<Self> {
        if header.starts_with(b"BZh") {
            Some(Self::TarBz2)
        } else if header.starts_with(&[0x1f, 0x8b]) {
            Some(Self::TarGz)
        } else if header.starts_with(&[0xfd, b'7', b'z', b'X', b'Z', 0x00]) {
            Some(Self::TarXz)
        } else if header.starts_with(b"PK\x03\x04") {
            Some(Self::Zip)
        } else if header.get(257..262) == Some(b"ustar".as_slice()) {
            Some(Self::Tar)
        } else {
            None
        }
    }

    /// Detect the format of the archive at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Extraction`] if the file cannot be read or the format is
    /// not recognized.
    pub fn detect(path: &Path) -> Result<Self> {
        if let Some(format) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(Self::from_file_name)
        {
            return Ok(format);
        }

        let mut header = Vec::with_capacity(512);
        File::open(path)
            .and_then(|f| f.take(512).read_to_end(&mut header))
            .map_err(|e| Error::extraction(path, format!("cannot read archive header: {e}")))?;

        Self::from_magic(&header)
            .ok_or_else(|| Error::extraction(path, "unrecognized archive format"))
    }
}

/// Decompressing reader for the tarball variants.
enum TarCompression<'a> {
    Plain(Box<dyn BufRead + 'a>),
    Gzip(flate2::read::GzDecoder<Box<dyn BufRead + 'a>>),
    Bzip2(bzip2::read::MultiBzDecoder<Box<dyn BufRead + 'a>>),
    Xz(xz2::read::XzDecoder<Box<dyn BufRead + 'a>>),
}

impl<'a> TarCompression<'a> {
    fn new(format: ArchiveFormat, reader: Box<dyn BufRead + 'a>) -> Self {
        match format {
            ArchiveFormat::TarGz => Self::Gzip(flate2::read::GzDecoder::new(reader)),
            ArchiveFormat::TarBz2 => Self::Bzip2(bzip2::read::MultiBzDecoder::new(reader)),
            ArchiveFormat::TarXz => Self::Xz(xz2::read::XzDecoder::new(reader)),
            ArchiveFormat::Tar | ArchiveFormat::Zip => Self::Plain(reader),
        }
    }
}

impl Read for TarCompression<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::Plain(reader) => reader.read(buf),
            Self::Gzip(reader) => reader.read(buf),
            Self::Bzip2(reader) => reader.read(buf),
            Self::Xz(reader) => reader.read(buf),
        }
    }
}

/// Extract `archive` into `dest`, returning the detected format.
///
/// # Errors
///
/// Returns [`Error::Extraction`] if the format is unknown or unpacking fails,
/// and [`Error::Io`] if the destination directory cannot be created.
pub fn extract_archive(
    archive: &Path,
    dest: &Path,
    handler: &dyn ProgressHandler,
) -> Result<ArchiveFormat> {
    let format = ArchiveFormat::detect(archive)?;
    info!(archive = %archive.display(), %format, "Unpack archive");

    std::fs::create_dir_all(dest).map_err(|e| Error::io("create directory", dest, e))?;

    let file = File::open(archive).map_err(|e| Error::io("open", archive, e))?;
    let len = file.metadata().map(|m| m.len()).unwrap_or(0);
    let bar = bytes_progress_bar(handler, len, "Extracting");
    let reader = bar.wrap_read(BufReader::with_capacity(1024 * 1024, file));

    let result = match format {
        ArchiveFormat::Zip => zip::ZipArchive::new(reader)
            .and_then(|mut zip| zip.extract(dest))
            .map_err(|e| e.to_string()),
        _ => tar::Archive::new(TarCompression::new(format, Box::new(reader)))
            .unpack(dest)
            .map_err(|e| e.to_string()),
    };

    match result {
        Ok(()) => {
            bar.finish_and_clear();
            debug!(dest = %dest.display(), "Successfully unpacked");
            Ok(format)
        }
        Err(message) => {
            bar.abandon();
            Err(Error::extraction(archive, message))
        }
    }
}
