//! Export codecs: pure encoders from a [`Diagram`] to downloadable text.
//!
//! Both encoders are total. They walk elements and connections in insertion
//! order, so encoding the same diagram twice yields byte-identical output.

pub mod bpmn;
pub mod mermaid;

pub use bpmn::to_bpmn_xml;
pub use mermaid::to_mermaid;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use crate::model::Diagram;

/// Supported download formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Mermaid `flowchart` text.
    Mermaid,
    /// BPMN 2.0 process-interchange XML.
    Bpmn,
}

impl ExportFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mermaid => "mmd",
            Self::Bpmn => "bpmn",
        }
    }

    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Mermaid => "text/plain",
            Self::Bpmn => "application/xml",
        }
    }
}

/// An encoded diagram ready to hand to a client as a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub mime_type: &'static str,
    pub content: String,
}

/// Encode `diagram` in `format` and name the file after the diagram.
#[must_use]
pub fn export(diagram: &Diagram, format: ExportFormat) -> ExportFile {
    let content = match format {
        ExportFormat::Mermaid => to_mermaid(diagram),
        ExportFormat::Bpmn => to_bpmn_xml(diagram),
    };
    ExportFile {
        filename: format!("{}.{}", file_stem(&diagram.name), format.extension()),
        mime_type: format.mime_type(),
        content,
    }
}

/// Diagram name made safe for a `Content-Disposition` filename.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_control() || matches!(c, '/' | '\\' | '"') { '_' } else { c })
        .collect();
    let stem = stem.trim();
    if stem.is_empty() { "diagram".to_string() } else { stem.to_string() }
}
