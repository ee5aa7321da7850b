//! Figure rendering (browser plotting library delegation)
//!
//! This layer turns an aligned [`SeriesSet`] into an embeddable chart: the
//! records' column maps become client-side data sources (JSON), the
//! interactive controls become static markup, and one script fragment wires
//! the controls to the plotting library. Rendering, zooming and event
//! dispatch all happen in the library; nothing here runs in the browser on
//! our behalf.
//!
//! Controls: two axis-field dropdowns, a three-way scale switch per axis
//! (linear, abs-log, power), a reset button, a marker toggle, and in
//! two-series comparison mode one visibility toggle per series.

pub mod template;

use std::fmt::Write;

use crate::align::SeriesSet;
use crate::{PlotMode, Result};

pub use template::PageTemplate;

/// Chart configuration: canvas size and the line color cycle.
#[derive(Debug, Clone)]
pub struct Figure {
    width: u32,
    height: u32,
    line_colors: Vec<String>,
}

impl Default for Figure {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            line_colors: ["black", "red", "blue", "green", "orange"]
                .into_iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl Figure {
    /// Default 800x600 chart with the standard color cycle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chart width in pixels.
    #[must_use]
    pub const fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Set the chart height in pixels.
    #[must_use]
    pub const fn height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    /// Replace the line color cycle (applied per series, cycling).
    #[must_use]
    pub fn line_colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.line_colors = colors.into_iter().map(Into::into).collect();
        self
    }

    /// Render the full document for an aligned series set.
    ///
    /// # Errors
    ///
    /// Returns an error if the column data cannot be serialized into the
    /// client-side data sources.
    pub fn render(
        &self,
        series: &SeriesSet,
        mode: PlotMode,
        title: &str,
        caption: &str,
        template: &PageTemplate,
    ) -> Result<String> {
        let markup = Self::markup(series, mode);
        let script = self.script(series, mode)?;
        Ok(template.render(title, &markup, &script, caption))
    }

    fn markup(series: &SeriesSet, mode: PlotMode) -> String {
        let mut select_x = String::new();
        let mut select_y = String::new();
        for field in series.fields() {
            let x_sel = if field == series.x_field() { " selected" } else { "" };
            let y_sel = if field == series.y_field() { " selected" } else { "" };
            let _ = writeln!(select_x, r#"        <option value="{field}"{x_sel}>{field}</option>"#);
            let _ = writeln!(select_y, r#"        <option value="{field}"{y_sel}>{field}</option>"#);
        }

        let mut star_toggles = String::new();
        if mode == PlotMode::Binary {
            for i in 0..series.records().len() {
                let _ = writeln!(
                    star_toggles,
                    r#"    <label><input type="checkbox" class="star-toggle" data-series="{i}" checked> show star {}</label>"#,
                    i + 1
                );
            }
        }

        format!(
            r#"<div class="viz-row">
<div class="viz-controls" id="viz-widgets">
    <label>x-quantity
        <select id="x-field-select">
{select_x}        </select>
    </label>
    <label>y-quantity
        <select id="y-field-select">
{select_y}        </select>
    </label>
{star_toggles}    <button id="reset-button" type="button">Reset</button>
    <label><input type="checkbox" id="marker-toggle"> Show markers</label>
    <fieldset>
        <legend>x-scale</legend>
        <label><input type="radio" name="x-scale" value="0" checked> linear</label>
        <label><input type="radio" name="x-scale" value="1"> abs(log)</label>
        <label><input type="radio" name="x-scale" value="2"> 10^</label>
    </fieldset>
    <fieldset>
        <legend>y-scale</legend>
        <label><input type="radio" name="y-scale" value="0" checked> linear</label>
        <label><input type="radio" name="y-scale" value="1"> abs(log)</label>
        <label><input type="radio" name="y-scale" value="2"> 10^</label>
    </fieldset>
</div>
<div id="viz-plot"></div>
</div>"#
        )
    }

    fn script(&self, series: &SeriesSet, mode: PlotMode) -> Result<String> {
        let sources: Vec<_> = series.records().iter().map(|r| r.columns()).collect();
        let sources_json = serde_json::to_string(&sources)?;
        let colors_json = serde_json::to_string(&self.line_colors)?;
        let x_default = serde_json::to_string(series.x_field())?;
        let y_default = serde_json::to_string(series.y_field())?;
        let show_legend = mode != PlotMode::Single;

        let mut script = String::new();
        let _ = write!(
            script,
            r#"<script>
(function () {{
const sources = {sources_json};
const colors = {colors_json};
const xDefault = {x_default};
const yDefault = {y_default};
const showLegend = {show_legend};
const chartWidth = {width};
const chartHeight = {height};
"#,
            width = self.width,
            height = self.height,
        );
        script.push_str(SCRIPT_RUNTIME);
        script.push_str("})();\n</script>");
        Ok(script)
    }
}

/// Control wiring executed in the browser. Everything below manipulates the
/// plotting library's data structures; trace order is all lines first, then
/// one marker trace per line.
const SCRIPT_RUNTIME: &str = r#"
const n = sources.length;
const plotDiv = document.getElementById('viz-plot');
const lineShown = sources.map(function () { return true; });
const lineIndices = sources.map(function (_, i) { return i; });
const markerIndices = sources.map(function (_, i) { return n + i; });

function isHrd(x, y) { return x === 'log_Teff' && y === 'log_L'; }

function scaled(values, mode) {
    if (mode === 1) { return values.map(function (v) { return Math.log10(Math.abs(v)); }); }
    if (mode === 2) { return values.map(function (v) { return Math.pow(10, v); }); }
    return values.slice();
}

function axisLabel(field, mode) {
    if (mode === 1) { return 'log(' + field + ')'; }
    if (mode === 2) { return '10^' + field; }
    return field;
}

function fieldOf(id) { return document.getElementById(id).value; }

function scaleOf(name) {
    return parseInt(document.querySelector('input[name="' + name + '"]:checked').value, 10);
}

function setScale(name, value) {
    document.querySelector('input[name="' + name + '"][value="' + value + '"]').checked = true;
}

function refresh() {
    const xField = fieldOf('x-field-select');
    const yField = fieldOf('y-field-select');
    const xMode = scaleOf('x-scale');
    const yMode = scaleOf('y-scale');
    const xs = [];
    const ys = [];
    for (let i = 0; i < n; i++) {
        sources[i].x_data = scaled(sources[i][xField], xMode);
        sources[i].y_data = scaled(sources[i][yField], yMode);
        xs.push(sources[i].x_data);
        ys.push(sources[i].y_data);
    }
    Plotly.restyle(plotDiv, { x: xs.concat(xs), y: ys.concat(ys) });
    Plotly.relayout(plotDiv, {
        'xaxis.title.text': axisLabel(xField, xMode),
        'yaxis.title.text': axisLabel(yField, yMode),
        'xaxis.autorange': isHrd(xField, yField) ? 'reversed' : true,
        'yaxis.autorange': true
    });
}

function syncMarkers() {
    const show = document.getElementById('marker-toggle').checked;
    const visible = lineShown.map(function (shown) { return show && shown; });
    Plotly.restyle(plotDiv, { visible: visible }, markerIndices);
}

const traces = [];
for (let i = 0; i < n; i++) {
    traces.push({
        x: sources[i].x_data,
        y: sources[i].y_data,
        mode: 'lines',
        line: { color: colors[i % colors.length], width: 2 },
        name: 'star' + (i + 1),
        showlegend: showLegend,
        hovertemplate: '(%{x}, %{y})<extra></extra>'
    });
}
for (let i = 0; i < n; i++) {
    traces.push({
        x: sources[i].x_data,
        y: sources[i].y_data,
        mode: 'markers',
        marker: { symbol: 'x', size: 12, color: colors[i % colors.length] },
        visible: false,
        showlegend: false,
        hoverinfo: 'skip'
    });
}

Plotly.newPlot(plotDiv, traces, {
    width: chartWidth,
    height: chartHeight,
    margin: { t: 30 },
    xaxis: {
        title: { text: xDefault },
        showgrid: false,
        autorange: isHrd(xDefault, yDefault) ? 'reversed' : true
    },
    yaxis: { title: { text: yDefault }, showgrid: false }
});

document.getElementById('x-field-select').addEventListener('change', function () {
    setScale('x-scale', 0);
    refresh();
});
document.getElementById('y-field-select').addEventListener('change', function () {
    setScale('y-scale', 0);
    refresh();
});
document.querySelectorAll('input[name="x-scale"], input[name="y-scale"]').forEach(function (radio) {
    radio.addEventListener('change', refresh);
});

document.getElementById('marker-toggle').addEventListener('change', syncMarkers);

document.querySelectorAll('.star-toggle').forEach(function (toggle) {
    toggle.addEventListener('change', function () {
        const i = parseInt(toggle.dataset.series, 10);
        lineShown[i] = toggle.checked;
        Plotly.restyle(plotDiv, { visible: toggle.checked }, [i]);
        syncMarkers();
    });
});

document.getElementById('reset-button').addEventListener('click', function () {
    document.getElementById('x-field-select').value = xDefault;
    document.getElementById('y-field-select').value = yDefault;
    setScale('x-scale', 0);
    setScale('y-scale', 0);
    document.getElementById('marker-toggle').checked = false;
    document.querySelectorAll('.star-toggle').forEach(function (toggle) {
        toggle.checked = true;
    });
    for (let i = 0; i < n; i++) { lineShown[i] = true; }
    Plotly.restyle(plotDiv, { visible: true }, lineIndices);
    syncMarkers();
    refresh();
});
"#;
