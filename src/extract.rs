//! Text extraction for the supported document formats.
//!
//! Connectors hand the pipeline a filesystem path; this module resolves the document type
//! from the file extension and returns the full plain-text contents as one string. PDF pages
//! arrive newline-separated, DOCX paragraphs are joined with a newline, and plain text is
//! read verbatim as UTF-8.

use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Decompressed byte cap for a single ZIP entry inside a DOCX container.
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Errors raised while extracting text from a document.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Document carried an extension outside the supported set.
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),
    /// Document bytes could not be read from disk.
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),
    /// PDF contents could not be parsed.
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    /// DOCX container or its document XML could not be parsed.
    #[error("DOCX extraction failed: {0}")]
    Docx(String),
}

/// Document formats accepted by the ingestion pipeline.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FileType {
    /// Portable Document Format.
    Pdf,
    /// Office Open XML word-processing document.
    Docx,
    /// UTF-8 plain text.
    Txt,
}

impl FileType {
    /// Resolve the document type from a path's extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }
}

/// Extract the full text of the document at `path` as a single string.
pub fn extract_text(path: &Path) -> Result<String, ExtractError> {
    let file_type = FileType::from_path(path).ok_or_else(|| {
        ExtractError::UnsupportedFileType(
            path.extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or("<none>")
                .to_string(),
        )
    })?;

    tracing::debug!(path = %path.display(), file_type = ?file_type, "Extracting document text");

    match file_type {
        FileType::Pdf => extract_pdf(&std::fs::read(path)?),
        FileType::Docx => extract_docx(&std::fs::read(path)?),
        FileType::Txt => Ok(std::fs::read_to_string(path)?),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|error| ExtractError::Pdf(error.to_string()))
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|error| ExtractError::Docx(error.to_string()))?;
    let mut document_xml = Vec::new();
    {
        let entry = archive
            .by_name("word/document.xml")
            .map_err(|_| ExtractError::Docx("word/document.xml not found".to_string()))?;
        entry
            .take(MAX_XML_ENTRY_BYTES)
            .read_to_end(&mut document_xml)
            .map_err(|error| ExtractError::Docx(error.to_string()))?;
        if document_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
            return Err(ExtractError::Docx(
                "word/document.xml exceeds size limit".to_string(),
            ));
        }
    }
    extract_paragraph_text(&document_xml)
}

/// Collect the `<w:t>` runs of each `<w:p>` paragraph and join paragraphs with a newline.
fn extract_paragraph_text(xml: &[u8]) -> Result<String, ExtractError> {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(element)) => {
                if element.local_name().as_ref() == b"t" {
                    in_text_run = true;
                }
            }
            Ok(Event::Text(text)) if in_text_run => {
                current.push_str(
                    text.unescape()
                        .map_err(|error| ExtractError::Docx(error.to_string()))?
                        .as_ref(),
                );
            }
            Ok(Event::End(element)) => match element.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(error) => return Err(ExtractError::Docx(error.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }

    Ok(paragraphs.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|text| format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>"))
            .collect();
        let xml = format!(
            "<?xml version=\"1.0\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>{body}</w:body></w:document>"
        );

        let mut buf = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
            writer
                .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        buf
    }

    #[test]
    fn file_type_resolves_known_extensions() {
        assert_eq!(FileType::from_path(Path::new("a/report.PDF")), Some(FileType::Pdf));
        assert_eq!(FileType::from_path(Path::new("notes.docx")), Some(FileType::Docx));
        assert_eq!(FileType::from_path(Path::new("readme.txt")), Some(FileType::Txt));
        assert_eq!(FileType::from_path(Path::new("image.png")), None);
        assert_eq!(FileType::from_path(Path::new("no-extension")), None);
    }

    #[test]
    fn unsupported_extension_returns_typed_error() {
        let error = extract_text(Path::new("slides.pptx")).unwrap_err();
        assert!(matches!(error, ExtractError::UnsupportedFileType(ext) if ext == "pptx"));
    }

    #[test]
    fn missing_file_surfaces_io_error() {
        let error = extract_text(Path::new("/nonexistent/file.txt")).unwrap_err();
        assert!(matches!(error, ExtractError::Io(_)));
    }

    #[test]
    fn txt_is_read_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, "  keep \n whitespace \n").unwrap();
        assert_eq!(extract_text(&path).unwrap(), "  keep \n whitespace \n");
    }

    #[test]
    fn invalid_pdf_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();
        assert!(matches!(extract_text(&path).unwrap_err(), ExtractError::Pdf(_)));
    }

    #[test]
    fn invalid_zip_returns_error_for_docx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"not a zip").unwrap();
        assert!(matches!(extract_text(&path).unwrap_err(), ExtractError::Docx(_)));
    }

    #[test]
    fn docx_paragraphs_join_with_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.docx");
        std::fs::write(&path, docx_with_paragraphs(&["first paragraph", "second paragraph"]))
            .unwrap();
        assert_eq!(
            extract_text(&path).unwrap(),
            "first paragraph\nsecond paragraph"
        );
    }

    #[test]
    fn docx_without_document_xml_is_rejected() {
        let mut buf = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
            writer
                .start_file("word/other.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"<x/>").unwrap();
            writer.finish().unwrap();
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.docx");
        std::fs::write(&path, buf).unwrap();
        let error = extract_text(&path).unwrap_err();
        assert!(matches!(error, ExtractError::Docx(message) if message.contains("document.xml")));
    }
}
