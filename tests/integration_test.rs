//! Integration test for the full pipeline:
//! 1. Write a history tree under /tmp
//! 2. Discover, load and align the runs
//! 3. Render and save the document

use std::fs;
use std::path::{Path, PathBuf};

use mesa_viz::align::AxisRequest;
use mesa_viz::history::LoadOptions;
use mesa_viz::render::Figure;
use mesa_viz::{Error, PlotMode, Plotter};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("mesa_viz=debug")
        .try_init()
        .ok();
}

fn test_root(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("mesa_viz_{}_{name}", std::process::id()));
    fs::remove_dir_all(&root).ok();
    fs::create_dir_all(&root).unwrap();
    root
}

fn write_history(path: &Path, fields: &[&str], rows: &[&[f64]]) {
    let mut text = String::from("initial_mass initial_z version\n1.0 0.02 \"r23.05.1\"\n\n");
    text.push_str(&fields.join(" "));
    text.push('\n');
    for row in rows {
        let line: Vec<String> = row.iter().map(f64::to_string).collect();
        text.push_str(&line.join(" "));
        text.push('\n');
    }
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

#[test]
fn test_multiple_mode_end_to_end() {
    init_tracing();
    let root = test_root("multiple");
    write_history(
        &root.join("run1/history.data"),
        &["star_age", "log_L", "log_Teff"],
        &[&[1.0, 0.5, 3.7], &[2.0, 0.8, 3.6]],
    );
    write_history(
        &root.join("run2/history.data"),
        &["star_age", "log_L", "log_Teff"],
        &[&[1.0, 0.4, 3.8], &[2.0, 0.6, 3.7]],
    );

    let plotter = Plotter::builder()
        .root(&root)
        .mode(PlotMode::Multiple)
        .build()
        .expect("discovery should find both runs");
    assert_eq!(plotter.files().len(), 2);

    let page = plotter.plot().expect("plot should render");
    let html = page.html();
    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains("Plotly.newPlot"));
    assert!(html.contains(r#"<option value="star_age" selected>star_age</option>"#));
    assert!(html.contains("star1 generated from"));
    assert!(html.contains("star2 generated from"));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_single_mode_save() {
    let root = test_root("single");
    write_history(
        &root.join("model/history.data"),
        &["star_age", "log_L"],
        &[&[1.0, 0.5], &[2.0, 0.8], &[3.0, 1.1]],
    );

    let out = root.join("plot.html");
    Plotter::builder()
        .root(&root)
        .mode(PlotMode::Single)
        .title("My Model")
        .build()
        .unwrap()
        .plot()
        .unwrap()
        .save(&out)
        .unwrap();

    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("<title>My Model</title>"));
    assert!(html.contains("Plot generated from directory"));
    // single mode carries no legend and no per-series toggles
    assert!(html.contains("const showLegend = false;"));
    assert!(!html.contains("star-toggle\" data-series"));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_binary_mode_caption_from_binary_history_header() {
    let root = test_root("binary");
    for star in ["star1", "star2"] {
        write_history(
            &root.join(star).join("history.data"),
            &["star_age", "log_L"],
            &[&[1.0, 0.5], &[2.0, 0.8]],
        );
    }
    fs::write(
        root.join("binary_history.data"),
        "initial_don_mass initial_acc_mass initial_period_days\n10.0 5.0 100.0\n\nage mdot\n1.0 2.0\n",
    )
    .unwrap();

    let html = Plotter::builder()
        .root(&root)
        .mode(PlotMode::Binary)
        .build()
        .unwrap()
        .plot()
        .unwrap()
        .html()
        .to_string();

    assert!(html.contains("10.000"));
    assert!(html.contains("0.500"));
    assert!(html.contains("2.000"));
    assert!(html.contains("show star 1"));
    assert!(html.contains("show star 2"));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_differing_field_sets_align_to_sorted_intersection() {
    let root = test_root("intersect");
    write_history(
        &root.join("run1/history.data"),
        &["star_age", "log_L", "log_R"],
        &[&[1.0, 0.5, 0.1]],
    );
    write_history(
        &root.join("run2/history.data"),
        &["log_L", "log_R", "log_Teff"],
        &[&[0.4, 0.2, 3.8]],
    );

    let html = Plotter::builder()
        .root(&root)
        .mode(PlotMode::Multiple)
        .build()
        .unwrap()
        .plot()
        .unwrap()
        .html()
        .to_string();

    // vocabulary reduces to [log_L, log_R]; the dropdowns carry only those
    assert!(html.contains(r#"<option value="log_L" selected>log_L</option>"#));
    assert!(html.contains(r#"<option value="log_R" selected>log_R</option>"#));
    assert!(!html.contains(r#"<option value="star_age""#));
    assert!(!html.contains(r#"<option value="log_Teff""#));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_requested_axis_falls_back_when_not_universal() {
    init_tracing();
    let root = test_root("fallback");
    write_history(
        &root.join("run1/history.data"),
        &["star_age", "log_L", "radius"],
        &[&[1.0, 0.5, 2.0]],
    );
    write_history(
        &root.join("run2/history.data"),
        &["star_age", "log_L"],
        &[&[1.0, 0.4]],
    );

    let html = Plotter::builder()
        .root(&root)
        .mode(PlotMode::Multiple)
        .axes(AxisRequest::new().x_field("radius"))
        .build()
        .unwrap()
        .plot()
        .unwrap()
        .html()
        .to_string();

    // radius is not universal, so x falls back to the first common field
    assert!(html.contains(r#"<option value="star_age" selected>star_age</option>"#));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_rounding_shrinks_embedded_samples() {
    let root = test_root("rounding");
    write_history(
        &root.join("run/history.data"),
        &["star_age", "log_L"],
        &[&[1.234_567_89, 0.5]],
    );

    let html = Plotter::builder()
        .root(&root)
        .load_options(LoadOptions::new().precision(3))
        .build()
        .unwrap()
        .plot()
        .unwrap()
        .html()
        .to_string();

    assert!(html.contains("1.235"));
    assert!(!html.contains("1.23456789"));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_explicit_file_list_bypasses_discovery() {
    let root = test_root("explicit");
    let file = root.join("elsewhere/renamed.data");
    write_history(&file, &["star_age", "log_L"], &[&[1.0, 0.5]]);

    let plotter = Plotter::builder()
        .history_files([&file])
        .mode(PlotMode::Single)
        .build()
        .unwrap();
    assert_eq!(plotter.files(), [file.clone()]);
    assert!(plotter.plot().is_ok());

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_empty_tree_is_an_error() {
    let root = test_root("empty");
    let result = Plotter::builder().root(&root).build();
    assert!(matches!(result, Err(Error::NoHistoryFiles { .. })));
    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_custom_figure_configuration() {
    let root = test_root("figure");
    write_history(
        &root.join("run/history.data"),
        &["star_age", "log_L"],
        &[&[1.0, 0.5]],
    );

    let html = Plotter::builder()
        .root(&root)
        .figure(Figure::new().width(640).height(480).line_colors(["purple"]))
        .build()
        .unwrap()
        .plot()
        .unwrap()
        .html()
        .to_string();

    assert!(html.contains("const chartWidth = 640;"));
    assert!(html.contains("const chartHeight = 480;"));
    assert!(html.contains("purple"));

    fs::remove_dir_all(&root).ok();
}
