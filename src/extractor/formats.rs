use crate::config::GzipLayout;
use crate::error::{Result, UnzipperError};
use crate::scanner::{ArchiveFile, ArchiveKind};
use flate2::bufread::GzDecoder;
use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

const COPY_CHUNK: usize = 8 * 1024;

/// What one archive produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveOutcome {
    pub entries_written: usize,
    pub entries_skipped: usize,
    pub bytes_written: u64,
}

pub(crate) struct FormatOptions {
    pub buffer_size: usize,
    pub gzip_layout: GzipLayout,
    pub preserve_mtime: bool,
}

enum CopyError {
    Read(io::Error),
    Write(io::Error),
}

fn copy_stream<R: Read, W: Write>(reader: &mut R, writer: &mut W) -> std::result::Result<u64, CopyError> {
    let mut total_bytes = 0u64;
    let mut buffer = vec![0u8; COPY_CHUNK];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };

        writer
            .write_all(&buffer[..bytes_read])
            .map_err(CopyError::Write)?;

        total_bytes += bytes_read as u64;
    }

    writer.flush().map_err(CopyError::Write)?;
    Ok(total_bytes)
}

#[derive(Debug, Default)]
struct GzipStream {
    members: usize,
    bytes: u64,
    mtime: u32,
}

/// Decode every gzip member in `reader` into `writer`. NUL padding after a
/// member is skipped and an empty input decodes to nothing; any other
/// trailing data is a header error.
fn decode_gzip_members<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
) -> std::result::Result<GzipStream, CopyError> {
    let mut stream = GzipStream::default();

    loop {
        let pending = reader.fill_buf().map_err(CopyError::Read)?;
        if pending.is_empty() {
            break;
        }

        if stream.members > 0 && pending[0] == 0 {
            let padding = pending.iter().take_while(|&&b| b == 0).count();
            reader.consume(padding);
            continue;
        }

        let mut decoder = GzDecoder::new(&mut *reader);
        stream.bytes += copy_stream(&mut decoder, writer)?;
        if stream.members == 0 {
            stream.mtime = decoder.header().map(|h| h.mtime()).unwrap_or(0);
        }
        stream.members += 1;
    }

    writer.flush().map_err(CopyError::Write)?;
    Ok(stream)
}

fn corrupt(archive: &ArchiveFile, reason: impl ToString) -> UnzipperError {
    UnzipperError::CorruptArchive {
        kind: archive.kind,
        path: archive.display_path(),
        reason: reason.to_string(),
    }
}

/// Decoder read failures that mean the data is bad rather than the disk.
fn is_format_error(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof
    )
}

fn read_failure(archive: &ArchiveFile, error: io::Error) -> UnzipperError {
    if is_format_error(&error) {
        corrupt(archive, error)
    } else {
        UnzipperError::Io(error)
    }
}

/// Extract every entry of a zip archive under `output_root`, keeping the
/// entry paths. Entries already written stay in place if a later one fails.
pub(crate) fn extract_zip(
    archive: &ArchiveFile,
    output_root: &Path,
    options: &FormatOptions,
) -> Result<ArchiveOutcome> {
    let file = fs::File::open(&archive.source_path)?;
    let reader = BufReader::with_capacity(options.buffer_size, file);

    let mut zip = zip::ZipArchive::new(reader).map_err(|e| corrupt(archive, e))?;
    let mut outcome = ArchiveOutcome::default();

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|e| corrupt(archive, e))?;

        // Absolute prefixes and `..` components are dropped, so every entry
        // lands inside the output directory.
        let relative = entry.mangled_name();
        let dest_path = output_root.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&dest_path)?;
            continue;
        }

        if relative.as_os_str().is_empty() {
            tracing::warn!(
                archive = %archive.display_path(),
                entry = entry.name(),
                "skipping zip entry with no usable file name"
            );
            outcome.entries_skipped += 1;
            continue;
        }

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let dest_file = fs::File::create(&dest_path)?;
        let mut writer = BufWriter::with_capacity(options.buffer_size, dest_file);

        let bytes = copy_stream(&mut entry, &mut writer).map_err(|e| match e {
            CopyError::Read(err) => read_failure(archive, err),
            CopyError::Write(err) => UnzipperError::Io(err),
        })?;

        outcome.entries_written += 1;
        outcome.bytes_written += bytes;
    }

    tracing::debug!(
        archive = %archive.display_path(),
        entries = outcome.entries_written,
        bytes = outcome.bytes_written,
        "zip extracted"
    );

    Ok(outcome)
}

/// Decompress a `.gz` file to its name without the suffix. The data is
/// staged in a temporary file next to the destination, so a corrupt stream
/// leaves nothing behind.
pub(crate) fn extract_gzip(
    archive: &ArchiveFile,
    output_root: &Path,
    options: &FormatOptions,
) -> Result<ArchiveOutcome> {
    let output_name = archive
        .kind
        .gzip_output_name(&archive.filename)
        .ok_or_else(|| UnzipperError::InvalidPath {
            path: format!("No output name left for {}", archive.display_path()),
        })?;

    let dest_dir = match options.gzip_layout {
        GzipLayout::Flat => output_root.to_path_buf(),
        GzipLayout::Mirror => match archive.relative_path.parent() {
            Some(parent) => output_root.join(parent),
            None => output_root.to_path_buf(),
        },
    };
    fs::create_dir_all(&dest_dir)?;
    let dest_path = dest_dir.join(output_name);

    let file = fs::File::open(&archive.source_path)?;
    let mut reader = BufReader::with_capacity(options.buffer_size, file);

    let staged = NamedTempFile::new_in(&dest_dir)?;
    let mut writer = BufWriter::with_capacity(options.buffer_size, staged);

    let stream = decode_gzip_members(&mut reader, &mut writer).map_err(|e| match e {
        CopyError::Read(err) => read_failure(archive, err),
        CopyError::Write(err) => UnzipperError::Io(err),
    })?;

    let staged = writer
        .into_inner()
        .map_err(|e| UnzipperError::Io(e.into_error()))?;
    staged.persist(&dest_path).map_err(|e| UnzipperError::Io(e.error))?;

    // MTIME of zero means the compressor did not record one
    if options.preserve_mtime && stream.mtime != 0 {
        let time = filetime::FileTime::from_unix_time(i64::from(stream.mtime), 0);
        if let Err(err) = filetime::set_file_mtime(&dest_path, time) {
            tracing::debug!(path = %dest_path.display(), error = %err, "could not set mtime");
        }
    }

    tracing::debug!(
        archive = %archive.display_path(),
        members = stream.members,
        bytes = stream.bytes,
        "gzip extracted"
    );

    Ok(ArchiveOutcome {
        entries_written: 1,
        entries_skipped: 0,
        bytes_written: stream.bytes,
    })
}

pub(crate) fn extract_archive(
    archive: &ArchiveFile,
    output_root: &Path,
    options: &FormatOptions,
) -> Result<ArchiveOutcome> {
    match archive.kind {
        ArchiveKind::Zip => extract_zip(archive, output_root, options),
        ArchiveKind::Gzip => extract_gzip(archive, output_root, options),
        ArchiveKind::Unrecognized => Err(UnzipperError::InvalidPath {
            path: format!("Not a recognised archive: {}", archive.display_path()),
        }),
    }
}
