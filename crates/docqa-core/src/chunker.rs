use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{chunk_id, Chunk};

/// Paragraph boundary used when no delimiter is configured.
pub const DEFAULT_CHUNK_DELIMITER: &str = "\n\n";

#[derive(Debug, Clone)]
pub struct Chunker {
    delimiter: String,
}

impl Default for Chunker {
    fn default() -> Self {
        Self { delimiter: DEFAULT_CHUNK_DELIMITER.to_string() }
    }
}

impl Chunker {
    pub fn new(delimiter: impl Into<String>) -> Result<Self> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(Error::InvalidConfig("chunk delimiter must not be empty".to_string()));
        }
        Ok(Self { delimiter })
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Split `document` on the delimiter, trim each segment and drop the empty
    /// ones. Identifiers follow the order of the surviving segments.
    pub fn chunk(&self, document: &str) -> Result<Vec<Chunk>> {
        let chunks: Vec<Chunk> = document
            .split(self.delimiter.as_str())
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .enumerate()
            .map(|(index, text)| Chunk { id: chunk_id(index), index, text: text.to_string() })
            .collect();
        if chunks.is_empty() {
            return Err(Error::EmptyDocument);
        }
        debug!(chunks = chunks.len(), "document split");
        Ok(chunks)
    }
}

/// Read the knowledge document, decoding invalid UTF-8 lossily.
pub fn load_document(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            Ok(String::from_utf8_lossy(&fs::read(path)?).into_owned())
        }
        Err(e) => Err(Error::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn splits_paragraphs_and_assigns_ids() {
        let doc = "Javier apoya drones de vigilancia.\n\nJavier promete 500 empleos jóvenes.";
        let chunks = Chunker::default().chunk(doc).expect("chunk");
        assert_eq!(texts(&chunks), ["Javier apoya drones de vigilancia.", "Javier promete 500 empleos jóvenes."]);
        assert_eq!(chunks[0].id, "doc_chunk_0");
        assert_eq!(chunks[1].id, "doc_chunk_1");
        assert_eq!(chunks[1].index, 1);
    }

    #[test]
    fn blank_segments_do_not_consume_ids() {
        let doc = "\n\n  uno  \n\n   \n\n\n\ndos\n\n";
        let chunks = Chunker::default().chunk(doc).expect("chunk");
        assert_eq!(texts(&chunks), ["uno", "dos"]);
        assert_eq!(chunks[1].id, "doc_chunk_1");
    }

    #[test]
    fn single_newlines_stay_inside_a_chunk() {
        let chunks = Chunker::default().chunk("línea uno\nlínea dos").expect("chunk");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "línea uno\nlínea dos");
    }

    #[test]
    fn whitespace_only_document_is_rejected() {
        assert!(matches!(Chunker::default().chunk(" \n\n \t \n\n"), Err(Error::EmptyDocument)));
        assert!(matches!(Chunker::default().chunk(""), Err(Error::EmptyDocument)));
    }

    #[test]
    fn custom_delimiter() {
        let chunker = Chunker::new("---").expect("chunker");
        let chunks = chunker.chunk("a --- b ---").expect("chunk");
        assert_eq!(texts(&chunks), ["a", "b"]);
    }

    #[test]
    fn empty_delimiter_is_invalid() {
        assert!(matches!(Chunker::new(""), Err(Error::InvalidConfig(_))));
    }
}
