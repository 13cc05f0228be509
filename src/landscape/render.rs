//! SVG rendering of the mutation landscape.
//!
//! The landscape is drawn without a plotting library: one `<rect>` per
//! mutated cell, colored by the category of the cell's dominant
//! classification, plus gene labels, a legend, and a title.

use std::fmt::Write as _;

use strum::IntoEnumIterator;

use super::categories::{CategoryConfig, MutationCategory};
use super::matrix::LandscapeTables;

/// Geometry and typography of the rendered plot.
#[derive(Debug, Clone)]
pub struct PlotSettings {
    /// Plot title, usually the cancer entity.
    pub title: String,
    /// Width of one sample cell in pixels.
    pub cell_width: f64,
    /// Height of one gene row in pixels.
    pub cell_height: f64,
    /// Font size for the title and axis label.
    pub font_size: u32,
    /// Font size for the gene labels.
    pub gene_font_size: u32,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            title: String::new(),
            cell_width: 6.0,
            cell_height: 12.0,
            font_size: 12,
            gene_font_size: 10,
        }
    }
}

/// Width reserved for the gene labels on the left.
const LABEL_WIDTH: f64 = 150.0;
/// Width reserved for the legend on the right.
const LEGEND_WIDTH: f64 = 120.0;
/// Height reserved for the title above the grid.
const TITLE_HEIGHT: f64 = 30.0;
/// Height reserved for the axis label below the grid.
const AXIS_HEIGHT: f64 = 30.0;
/// Height of one legend entry.
const LEGEND_STEP: f64 = 18.0;

/// Render the landscape as an SVG document.
///
/// `order` is the column permutation from [`super::sorting::sort_samples`];
/// cells are drawn in that order left to right, genes top to bottom in
/// rank order.
pub fn render_svg(
    tables: &LandscapeTables,
    order: &[usize],
    config: &CategoryConfig,
    settings: &PlotSettings,
) -> String {
    let matrix = &tables.matrix;
    let grid_width = matrix.n_samples() as f64 * settings.cell_width;
    let grid_height = matrix.n_genes() as f64 * settings.cell_height;
    let width = LABEL_WIDTH + grid_width + LEGEND_WIDTH;
    let height = (TITLE_HEIGHT + grid_height + AXIS_HEIGHT)
        .max(TITLE_HEIGHT + MutationCategory::iter().count() as f64 * LEGEND_STEP);

    let mut svg = String::new();
    let out = &mut svg;
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}">"#,
        width, height, width, height
    )
    .expect("write to String");
    writeln!(
        out,
        "<!-- generated by mutscape {} -->",
        crate::common::worker_version()
    )
    .expect("write to String");
    writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#).expect("write to String");

    // Title.
    if !settings.title.is_empty() {
        writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="{}" font-family="sans-serif">{}</text>"#,
            LABEL_WIDTH + grid_width / 2.0,
            TITLE_HEIGHT / 2.0 + settings.font_size as f64 / 2.0,
            settings.font_size + 2,
            xml_escape(&settings.title)
        )
        .expect("write to String");
    }

    // Mutation cells.
    for (gene_idx, gene) in matrix.genes.iter().enumerate() {
        let y = TITLE_HEIGHT + gene_idx as f64 * settings.cell_height;
        for (draw_idx, &sample_idx) in order.iter().enumerate() {
            if !matrix.present(gene_idx, sample_idx) {
                continue;
            }
            let sample = &matrix.samples[sample_idx];
            let Some(category) = tables
                .dominant_type(gene, sample)
                .and_then(|classification| config.category(classification))
            else {
                continue;
            };
            let x = LABEL_WIDTH + draw_idx as f64 * settings.cell_width;
            writeln!(
                out,
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
                x,
                y,
                settings.cell_width,
                settings.cell_height,
                category.color()
            )
            .expect("write to String");
        }
    }

    // White separators between gene rows.
    for gene_idx in 1..matrix.n_genes() {
        let y = TITLE_HEIGHT + gene_idx as f64 * settings.cell_height;
        writeln!(
            out,
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="white" stroke-width="1" stroke-opacity="0.5"/>"#,
            LABEL_WIDTH,
            y,
            LABEL_WIDTH + grid_width,
            y
        )
        .expect("write to String");
    }

    // Gene labels with frequency percentage.
    for (gene_idx, gene) in matrix.genes.iter().enumerate() {
        let y = TITLE_HEIGHT
            + gene_idx as f64 * settings.cell_height
            + settings.cell_height / 2.0
            + settings.gene_font_size as f64 / 2.0;
        let frequency = tables.gene_frequency(gene).unwrap_or(0.0);
        writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="{}" font-family="sans-serif">{} ({:.1}%)</text>"#,
            LABEL_WIDTH - 4.0,
            y,
            settings.gene_font_size,
            xml_escape(gene),
            frequency
        )
        .expect("write to String");
    }

    // Axis label below the grid.
    writeln!(
        out,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="{}" font-family="sans-serif">Samples (n={})</text>"#,
        LABEL_WIDTH + grid_width / 2.0,
        TITLE_HEIGHT + grid_height + AXIS_HEIGHT / 2.0 + settings.font_size as f64 / 2.0,
        settings.font_size,
        matrix.n_samples()
    )
    .expect("write to String");

    // Legend with one entry per display category.
    for (entry_idx, category) in MutationCategory::iter().enumerate() {
        let x = LABEL_WIDTH + grid_width + 10.0;
        let y = TITLE_HEIGHT + entry_idx as f64 * LEGEND_STEP;
        writeln!(
            out,
            r#"<rect x="{:.1}" y="{:.1}" width="12" height="12" fill="{}"/>"#,
            x,
            y,
            category.color()
        )
        .expect("write to String");
        writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" font-size="{}" font-family="sans-serif">{}</text>"#,
            x + 16.0,
            y + 10.0,
            settings.gene_font_size,
            category.label()
        )
        .expect("write to String");
    }

    writeln!(out, "</svg>").expect("write to String");

    svg
}

/// Escape the XML special characters of a text node.
fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::landscape::categories::CategoryConfig;
    use crate::landscape::maf::MutationRecord;
    use crate::landscape::matrix::build_tables;
    use crate::landscape::sorting::sort_samples;

    use super::PlotSettings;

    fn record(gene: &str, classification: &str, sample: &str) -> MutationRecord {
        MutationRecord {
            gene: gene.to_string(),
            variant_classification: classification.to_string(),
            sample_id: sample.to_string(),
        }
    }

    #[test]
    fn render_svg_smoke() {
        let records = vec![
            record("GeneA", "Missense_Mutation", "S1"),
            record("GeneA", "Nonsense_Mutation", "S2"),
            record("GeneB", "Silent", "S1"),
        ];
        let config = CategoryConfig::default();
        let tables = build_tables(&records, 2, &config);
        let order = sort_samples(&tables.matrix);
        let settings = PlotSettings {
            title: "Pancreatic Ductal Adenocarcinoma".to_string(),
            ..Default::default()
        };

        let svg = super::render_svg(&tables, &order, &config, &settings);

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("<!-- generated by mutscape x.y.z -->"));
        assert!(svg.contains("Pancreatic Ductal Adenocarcinoma"));
        assert!(svg.contains("Samples (n=2)"));
        assert!(svg.contains("GeneA (100.0%)"));
        assert!(svg.contains("GeneB (50.0%)"));
        // Missense cell, nonsense cell, synonymous cell.
        assert!(svg.contains("#336699"));
        assert!(svg.contains("#cc0033"));
        assert!(svg.contains("#d2dae2"));
        // Legend entries.
        assert!(svg.contains(">Critical Site</text>"));
        assert!(svg.contains(">Frameshift</text>"));
    }

    #[test]
    fn render_svg_empty_tables() {
        let config = CategoryConfig::default();
        let tables = build_tables(&[], 10, &config);
        let order = sort_samples(&tables.matrix);

        let svg = super::render_svg(&tables, &order, &config, &PlotSettings::default());

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Samples (n=0)"));
    }

    #[test]
    fn xml_escape_special_characters() {
        assert_eq!("a&amp;b&lt;c&gt;d", super::xml_escape("a&b<c>d"));
    }
}
