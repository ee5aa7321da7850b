//! Plot assembly
//!
//! One-shot batch pipeline: discover history files under the source roots,
//! load them sequentially, align them into a [`SeriesSet`], and render the
//! document with a caption assembled from header metadata. Invocation is by
//! direct construction through [`PlotterBuilder`]; there are no environment
//! variables and no command-line surface.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::align::{AxisRequest, SeriesSet};
use crate::history::{HistoryRecord, LoadOptions};
use crate::render::{Figure, PageTemplate};
use crate::{Error, PlotMode, Result};

/// Default per-object history file name.
pub const HISTORY_FILE_NAME: &str = "history.data";

/// File name binary-system runs use for the shared-orbit history whose
/// header feeds the caption.
pub const BINARY_HISTORY_FILE: &str = "binary_history.data";

/// Initial binary-system parameters derived from a binary history header.
///
/// Header keys that are absent read as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryParams {
    /// Initial donor mass, rounded to 2 decimals
    pub m1: f64,
    /// Initial mass ratio accretor/donor, rounded to 2 decimals (zero when
    /// the donor mass is zero)
    pub q: f64,
    /// log10 of the initial period in days, rounded to 3 decimals
    pub log_p: f64,
}

impl BinaryParams {
    /// Derive the caption parameters from a parsed binary history record.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn from_record(record: &HistoryRecord) -> Self {
        let m1 = record.header_number("initial_don_mass").unwrap_or(0.0);
        let m2 = record.header_number("initial_acc_mass").unwrap_or(0.0);
        let q = if m1 == 0.0 {
            0.0
        } else {
            round_to(m2 / m1, 2)
        };
        let period = record.header_number("initial_period_days").unwrap_or(0.0);
        Self {
            m1: round_to(m1, 2),
            q,
            log_p: round_to(period.log10(), 3),
        }
    }

    fn math_markup(&self) -> String {
        format!(
            "<p><math>M<sub>1,i</sub> = {:.3} M<sub>&#9737;</sub></math>, \
             <math>q<sub>i</sub> = {:.3}</math>, \
             <math>log<sub>10</sub>(P<sub>i</sub>/days) = {:.3}</math></p>",
            self.m1, self.q, self.log_p
        )
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// The finished document.
#[derive(Debug, Clone)]
pub struct Page {
    html: String,
}

impl Page {
    /// The document text.
    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Write the document to a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), &self.html)?;
        Ok(())
    }
}

/// Builder for [`Plotter`].
#[derive(Debug, Clone, Default)]
pub struct PlotterBuilder {
    roots: Vec<PathBuf>,
    files: Vec<PathBuf>,
    mode: Option<PlotMode>,
    history_file_name: Option<String>,
    options: LoadOptions,
    request: AxisRequest,
    figure: Figure,
    template: Option<PageTemplate>,
    title: Option<String>,
}

impl PlotterBuilder {
    /// Add a source root directory to scan for history files.
    #[must_use]
    pub fn root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.roots.push(root.into());
        self
    }

    /// Use an explicit list of history files, bypassing discovery.
    #[must_use]
    pub fn history_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Select the comparison mode (defaults to [`PlotMode::Single`]).
    #[must_use]
    pub fn mode(mut self, mode: PlotMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Override the history file name searched for during discovery.
    #[must_use]
    pub fn history_file_name(mut self, name: impl Into<String>) -> Self {
        self.history_file_name = Some(name.into());
        self
    }

    /// Pass loader options (field subset, rounding precision) through to
    /// every record.
    #[must_use]
    pub fn load_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    /// Request axis fields; unavailable fields fall back during alignment.
    #[must_use]
    pub fn axes(mut self, request: AxisRequest) -> Self {
        self.request = request;
        self
    }

    /// Configure the chart.
    #[must_use]
    pub fn figure(mut self, figure: Figure) -> Self {
        self.figure = figure;
        self
    }

    /// Substitute a custom page skeleton.
    #[must_use]
    pub fn template(mut self, template: PageTemplate) -> Self {
        self.template = Some(template);
        self
    }

    /// Set the page title (defaults to "MESA Model").
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Discover history files and finish the plotter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if a source root cannot be scanned and
    /// [`Error::NoHistoryFiles`] if discovery turns up nothing.
    pub fn build(self) -> Result<Plotter> {
        let history_file_name = self
            .history_file_name
            .unwrap_or_else(|| HISTORY_FILE_NAME.to_string());

        let files = if self.files.is_empty() {
            let mut found = Vec::new();
            for root in &self.roots {
                scan_for(root, &history_file_name, &mut found)?;
            }
            found
        } else {
            self.files
        };

        if files.is_empty() {
            return Err(Error::NoHistoryFiles {
                file_name: history_file_name,
                root: self.roots.first().cloned().unwrap_or_default(),
            });
        }

        Ok(Plotter {
            roots: self.roots,
            files,
            mode: self.mode.unwrap_or(PlotMode::Single),
            options: self.options,
            request: self.request,
            figure: self.figure,
            template: self.template.unwrap_or_default(),
            title: self.title.unwrap_or_else(|| "MESA Model".to_string()),
        })
    }
}

/// Recursive scan for files with a given name, in sorted directory order.
fn scan_for(dir: &Path, name: &str, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();
    for path in entries {
        if path.is_dir() {
            scan_for(&path, name, out)?;
        } else if path.file_name().and_then(|f| f.to_str()) == Some(name) {
            out.push(path);
        }
    }
    Ok(())
}

/// One-shot plot generator over a set of discovered history files.
pub struct Plotter {
    roots: Vec<PathBuf>,
    files: Vec<PathBuf>,
    mode: PlotMode,
    options: LoadOptions,
    request: AxisRequest,
    figure: Figure,
    template: PageTemplate,
    title: String,
}

impl Plotter {
    /// Create a new plotter builder.
    #[must_use]
    pub fn builder() -> PlotterBuilder {
        PlotterBuilder::default()
    }

    /// The history files the plot will be generated from.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Load, align and render the plot document.
    ///
    /// Records load strictly sequentially; the first failure aborts the
    /// whole batch.
    ///
    /// # Errors
    ///
    /// Propagates loader parse failures, [`Error::NoCommonFields`] from
    /// alignment, and serialization failures from rendering.
    pub fn plot(&self) -> Result<Page> {
        info!(files = self.files.len(), mode = ?self.mode, "loading history files");
        let mut records = Vec::with_capacity(self.files.len());
        for file in &self.files {
            records.push(HistoryRecord::load(file, &self.options)?);
        }

        let series = SeriesSet::align(records, &self.request)?;
        let caption = self.caption(&series)?;
        let html = self
            .figure
            .render(&series, self.mode, &self.title, &caption, &self.template)?;
        Ok(Page { html })
    }

    fn caption(&self, series: &SeriesSet) -> Result<String> {
        let mut caption = String::new();
        match self.mode {
            PlotMode::Binary => {
                if let Some(root) = self.roots.first() {
                    let binary_path = root.join(BINARY_HISTORY_FILE);
                    if binary_path.is_file() {
                        let record = HistoryRecord::load(&binary_path, &LoadOptions::new())?;
                        caption.push_str(&BinaryParams::from_record(&record).math_markup());
                        caption.push('\n');
                    }
                    caption.push_str(&format!(
                        "<p>Plot generated from directory {}</p>",
                        root.display()
                    ));
                }
            }
            PlotMode::Multiple => {
                for (i, record) in series.records().iter().enumerate() {
                    caption.push_str(&format!(
                        "<p>star{} generated from {}</p>\n",
                        i + 1,
                        record.path().display()
                    ));
                }
            }
            PlotMode::Single => {
                if let Some(root) = self.roots.first() {
                    caption.push_str(&format!(
                        "<p>Plot generated from directory {}</p>",
                        root.display()
                    ));
                }
            }
        }
        Ok(caption)
    }
}
