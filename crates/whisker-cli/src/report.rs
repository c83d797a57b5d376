//! Self-contained HTML reports built from maud markup and plotly figures.

use anyhow::{Context, Result};
use chrono::Local;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::Plot;
use serde::Serialize;
use std::path::Path;

use crate::util::write_bytes_to_file;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

pub struct ReportSection {
    title: String,
    blocks: Vec<Markup>,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            blocks: Vec::new(),
        }
    }

    pub fn add_content(&mut self, content: Markup) {
        self.blocks.push(content);
    }

    pub fn add_plot(&mut self, plot: Plot) {
        let div_id = format!(
            "plot-{}-{}",
            self.title.to_lowercase().replace(' ', "-"),
            self.blocks.len()
        );
        self.blocks
            .push(PreEscaped(plot.to_inline_html(Some(div_id.as_str()))));
    }

    /// Pretty-printed JSON of `value` in a code block.
    pub fn add_json<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.add_content(html! {
            div class="code-container" {
                pre { code { (json) } }
            }
        });
        Ok(())
    }

    /// Two-column key/value table.
    pub fn add_table(&mut self, rows: &[(&str, String)]) {
        self.add_content(html! {
            table {
                @for (key, value) in rows {
                    tr { th { (key) } td { (value) } }
                }
            }
        });
    }

    fn render(&self) -> Markup {
        html! {
            section {
                h2 { (self.title) }
                @for block in &self.blocks {
                    div class="block" { (block) }
                }
            }
        }
    }
}

pub struct Report {
    title: String,
    version: String,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(title: &str, version: &str) -> Self {
        Self {
            title: title.to_string(),
            version: version.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn render(&self) -> String {
        let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let page = html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src=(PLOTLY_CDN) {}
                    style {
                        "body { font-family: sans-serif; margin: 2em; }
                        table { border-collapse: collapse; }
                        th, td { border: 1px solid #ddd; padding: 4px 12px; text-align: left; }
                        .code-container {
                            background-color: #f5f5f5;
                            padding: 10px;
                            border-radius: 5px;
                            overflow-x: auto;
                            font-family: monospace;
                            white-space: pre-wrap;
                        }"
                    }
                }
                body {
                    h1 { (self.title) }
                    p { "whisker " (self.version) " | generated " (generated) }
                    @for section in &self.sections {
                        (section.render())
                    }
                }
            }
        };
        page.into_string()
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        write_bytes_to_file(path, self.render().as_bytes())
            .with_context(|| format!("Failed to write report: {:?}", path))?;
        log::info!("Report written to {}", path.display());
        Ok(())
    }
}
