//! Page skeleton substitution
//!
//! The emitted document is a fixed skeleton with five placeholders:
//! `{{title}}`, `{{markup}}`, `{{script}}`, `{{caption}}` and
//! `{{generated}}`. The default skeleton pulls the plotting library from
//! its CDN; a custom skeleton can be loaded from a file as long as it
//! carries the same placeholders.

use std::fs;
use std::path::Path;

use chrono::Utc;

use crate::Result;

/// Pinned CDN build of the browser plotting library.
pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.0.min.js";

const DEFAULT_SKELETON: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>{{title}}</title>
    <script src="https://cdn.plot.ly/plotly-2.35.0.min.js" crossorigin="anonymous"></script>
    <style>
        body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 1200px; padding: 16px; }
        .viz-row { display: flex; gap: 16px; align-items: flex-start; }
        .viz-controls { display: flex; flex-direction: column; gap: 8px; min-width: 160px; }
        .viz-controls fieldset { border: 1px solid #ccc; }
        .viz-caption { margin-top: 8px; }
        footer { color: #888; font-size: 0.8em; margin-top: 16px; }
    </style>
</head>
<body>
{{markup}}
<hr width="80%" align="center">
<div class="viz-caption">{{caption}}</div>
{{script}}
<footer>Generated {{generated}}</footer>
</body>
</html>
"#;

/// A page skeleton with placeholder substitution.
#[derive(Debug, Clone)]
pub struct PageTemplate {
    skeleton: String,
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self::new()
    }
}

impl PageTemplate {
    /// The built-in skeleton.
    #[must_use]
    pub fn new() -> Self {
        Self {
            skeleton: DEFAULT_SKELETON.to_string(),
        }
    }

    /// Load a custom skeleton from a file.
    ///
    /// The skeleton should carry the `{{title}}`, `{{markup}}`,
    /// `{{script}}`, `{{caption}}` and `{{generated}}` placeholders and is
    /// responsible for loading the plotting library itself.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the file cannot be read.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            skeleton: fs::read_to_string(path)?,
        })
    }

    /// Substitute the fragments into the skeleton.
    #[must_use]
    pub fn render(&self, title: &str, markup: &str, script: &str, caption: &str) -> String {
        self.skeleton
            .replace("{{title}}", title)
            .replace("{{markup}}", markup)
            .replace("{{script}}", script)
            .replace("{{caption}}", caption)
            .replace("{{generated}}", &Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string())
    }
}
