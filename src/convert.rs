//! Document conversion: notebooks and markdown pages rendered to runnable
//! code or to markdown text.
//!
//! The harness only ever sees conversion through the [`Convert`] trait; the
//! nbformat-4 JSON reading below is an implementation detail and a malformed
//! notebook is one document's failure, never the run's.

use crate::scan::{Document, DocumentKind};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;

/// Conversion seam between the harness and document formats.
pub trait Convert {
    /// Runnable source for an executable document.
    fn to_code(&self, doc: &Document) -> Result<String>;
    /// Markdown rendering used for link extraction.
    fn to_markdown(&self, doc: &Document) -> Result<String>;
}

/// nbformat-4 JSON reader used in production.
#[derive(Debug, Default)]
pub struct NotebookConverter;

#[derive(Debug, Deserialize)]
struct Notebook {
    #[serde(default)]
    cells: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    cell_type: String,
    #[serde(default)]
    source: SourceText,
    #[serde(default)]
    outputs: Vec<CellOutput>,
}

/// Cell sources are stored either as one block or as a list of lines that
/// already carry their newlines.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SourceText {
    Lines(Vec<String>),
    Block(String),
}

impl Default for SourceText {
    fn default() -> Self {
        SourceText::Block(String::new())
    }
}

impl SourceText {
    fn text(&self) -> String {
        match self {
            SourceText::Lines(lines) => lines.concat(),
            SourceText::Block(block) => block.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CellOutput {
    #[serde(default)]
    data: BTreeMap<String, serde_json::Value>,
}

impl NotebookConverter {
    fn read_notebook(&self, doc: &Document) -> Result<Notebook> {
        let bytes = fs::read(&doc.path)
            .with_context(|| format!("read notebook {}", doc.path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("parse notebook {}", doc.path.display()))
    }
}

impl Convert for NotebookConverter {
    fn to_code(&self, doc: &Document) -> Result<String> {
        match doc.kind {
            DocumentKind::Notebook => {}
            DocumentKind::Markdown => {
                return Err(anyhow!(
                    "markdown page {} has no runnable form",
                    doc.path.display()
                ));
            }
        }
        let notebook = self.read_notebook(doc)?;
        let mut code = String::from("#!/usr/bin/env python\n# coding: utf-8\n");
        let mut cell_number = 0usize;
        for cell in &notebook.cells {
            if cell.cell_type != "code" {
                continue;
            }
            cell_number += 1;
            code.push_str(&format!("\n# In[{cell_number}]:\n\n"));
            code.push_str(&cell.source.text());
            code.push('\n');
        }
        Ok(code)
    }

    fn to_markdown(&self, doc: &Document) -> Result<String> {
        match doc.kind {
            DocumentKind::Markdown => fs::read_to_string(&doc.path)
                .with_context(|| format!("read page {}", doc.path.display())),
            DocumentKind::Notebook => {
                let notebook = self.read_notebook(doc)?;
                let mut rendered = String::new();
                let mut cell_number = 0usize;
                for cell in &notebook.cells {
                    match cell.cell_type.as_str() {
                        "markdown" => {
                            rendered.push_str(&cell.source.text());
                            rendered.push_str("\n\n");
                        }
                        "code" => {
                            cell_number += 1;
                            rendered.push_str("```python\n");
                            rendered.push_str(&cell.source.text());
                            rendered.push_str("\n```\n\n");
                            render_figure_links(&mut rendered, cell_number, &cell.outputs);
                        }
                        _ => {}
                    }
                }
                Ok(rendered)
            }
        }
    }
}

/// Rendered display-data figures reference generated files by convention;
/// the link checker recognizes and skips these names.
fn render_figure_links(rendered: &mut String, cell_number: usize, outputs: &[CellOutput]) {
    for (output_number, output) in outputs.iter().enumerate() {
        if output.data.contains_key("image/png") {
            rendered.push_str(&format!(
                "![png](output_{cell_number}_{output_number}.png)\n\n"
            ));
        } else if output.data.contains_key("image/svg+xml") {
            rendered.push_str(&format!(
                "![svg](output_{cell_number}_{output_number}.svg)\n\n"
            ));
        }
    }
}
