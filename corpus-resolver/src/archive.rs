//! Compressed MusicXML containers
//!
//! An `.mxl` file is a zip archive holding the score document and a
//! `META-INF/container.xml` manifest naming it as the root file.

use crate::corpus::Corpus;
use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::extensions::ExtensionSet;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const CONTAINER_PATH: &str = "META-INF/container.xml";

fn xml_error(err: impl std::fmt::Display) -> Error {
    Error::Archive(format!("Container manifest: {}", err))
}

/// Manifest naming `root_file` as the container's document.
///
/// The attribute value is escaped by the writer.
pub fn container_manifest(root_file: &str) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("container")))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("rootfiles")))
        .map_err(xml_error)?;

    let mut rootfile = BytesStart::new("rootfile");
    rootfile.push_attribute(("full-path", root_file));
    writer
        .write_event(Event::Empty(rootfile))
        .map_err(xml_error)?;

    writer
        .write_event(Event::End(BytesEnd::new("rootfiles")))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("container")))
        .map_err(xml_error)?;
    Ok(writer.into_inner())
}

/// Unescaped `full-path` of the first `rootfile` element in a manifest
pub fn parse_root_file(manifest: &str) -> Option<String> {
    let mut reader = Reader::from_str(manifest);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"rootfile" =>
            {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"full-path" {
                        return attr.unescape_value().ok().map(|value| value.into_owned());
                    }
                }
            }
            Ok(Event::Eof) => return None,
            Err(e) => {
                warn!("Unreadable container manifest: {}", e);
                return None;
            }
            _ => {}
        }
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| Error::Archive(format!("No file name in {}", path.display())))
}

/// Zip `source` and its manifest into `archive_path`
fn write_container(source: &Path, archived_name: &str, archive_path: &Path) -> Result<()> {
    let mut input = File::open(source)?;
    let mut zip = ZipWriter::new(File::create(archive_path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(archived_name, options)?;
    io::copy(&mut input, &mut zip)?;
    zip.start_file(CONTAINER_PATH, options)?;
    zip.write_all(&container_manifest(archived_name)?)?;
    zip.finish()?.sync_all()?;
    Ok(())
}

/// Package an `.xml` document as a sibling `.mxl` container.
///
/// The archive is written under a temporary name and renamed into place,
/// so a failed write never leaves a truncated container.
///
/// Returns the new archive path, or `None` when `path` is not `.xml`.
pub fn compress_xml(path: &Path, delete_original: bool) -> Result<Option<PathBuf>> {
    if !has_extension(path, "xml") {
        debug!("Not a MusicXML document, skipping: {}", path.display());
        return Ok(None);
    }

    let archived_name = file_name_of(path)?;
    let target = path.with_extension("mxl");
    let temp_path = path.with_extension("mxl.tmp");

    info!("Compressing {} -> {}", path.display(), target.display());
    let written = write_container(path, &archived_name, &temp_path)
        .and_then(|_| fs::rename(&temp_path, &target).map_err(Error::from));
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    if delete_original {
        fs::remove_file(path)?;
    }
    Ok(Some(target))
}

/// Extract the root document of an `.mxl` container next to it.
///
/// Returns the extracted path, or `None` when `path` is not `.mxl`.
pub fn uncompress_mxl(path: &Path, delete_original: bool) -> Result<Option<PathBuf>> {
    if !has_extension(path, "mxl") {
        debug!("Not a compressed MusicXML container, skipping: {}", path.display());
        return Ok(None);
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| Error::Archive(format!("No file name in {}", path.display())))?;
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    let target = {
        let mut archive = ZipArchive::new(File::open(path)?)?;

        let mut manifest = String::new();
        let root_file = match archive.by_name(CONTAINER_PATH) {
            Ok(mut entry) => {
                entry.read_to_string(&mut manifest)?;
                parse_root_file(&manifest)
            }
            Err(_) => None,
        }
        .unwrap_or_else(|| format!("{}.xml", stem));

        // Only the file name is used; the manifest must not place files
        // outside the archive's directory
        let target_name = Path::new(&root_file)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Error::Archive(format!("Invalid root file: {}", root_file)))?;
        let target = parent.join(target_name);

        let mut entry = archive
            .by_name(&root_file)
            .map_err(|e| Error::Archive(format!("{}: {}", root_file, e)))?;
        info!("Extracting {} -> {}", path.display(), target.display());
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
        target
    };

    if delete_original {
        fs::remove_file(path)?;
    }
    Ok(Some(target))
}

impl Corpus {
    /// Compress every plain `.xml` document of the core corpus
    pub fn compress_all_xml(&self, delete_original: bool) -> Result<Vec<PathBuf>> {
        let xml_only = ExtensionSet::expand(Some(&[".xml"][..]), false);
        let listing = self.listing(Domain::Core, &xml_only)?;
        info!("Compressing {} MusicXML files", listing.len());

        let mut written = Vec::new();
        for path in listing.iter() {
            if let Some(file) = path.as_path() {
                if let Some(archive) = compress_xml(file, delete_original)? {
                    written.push(archive);
                }
            }
        }

        self.invalidate(Domain::Core);
        Ok(written)
    }
}
