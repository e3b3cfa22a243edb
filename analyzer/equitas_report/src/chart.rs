//! Bar charts of per-group positive-outcome proportions.

use std::fmt::Write as _;

use equitas_metrics::GroupProportions;

/// Horizontal ASCII bars, one line per group, scaled so that a proportion
/// of 1.0 spans `max_width` characters.
///
/// Returns no lines when there is nothing to draw: an empty map, a zero
/// width, or every proportion at 0.
pub fn bar_chart_ascii(proportions: &GroupProportions, max_width: usize) -> Vec<String> {
    if max_width == 0 || !has_signal(proportions) {
        return Vec::new();
    }
    let label_width = proportions
        .keys()
        .map(|k| k.to_string().chars().count())
        .max()
        .unwrap_or(0);
    proportions
        .iter()
        .map(|(group, p)| {
            let len = (p.clamp(0.0, 1.0) * max_width as f64).round() as usize;
            format!(
                "{:<label_width$} | {} ({:.3})",
                group.to_string(),
                "#".repeat(len),
                p
            )
        })
        .collect()
}

/// Standalone SVG bar chart with a fixed 0..1 y axis, or `None` when every
/// proportion is 0 (or there are no groups).
pub fn bar_chart_svg(
    title: &str,
    proportions: &GroupProportions,
    width: u32,
    height: u32,
) -> Option<String> {
    if !has_signal(proportions) || width == 0 || height == 0 {
        return None;
    }

    let (w, h) = (f64::from(width), f64::from(height));
    let margin = 30.0;
    let plot_w = (w - 2.0 * margin).max(1.0);
    let plot_h = (h - 2.0 * margin).max(1.0);
    let slot = plot_w / proportions.len() as f64;
    let bar_w = slot * 0.7;

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );
    let _ = write!(
        svg,
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"14\">{}</text>",
        w / 2.0,
        margin * 0.6,
        escape(title)
    );
    // axis
    let _ = write!(
        svg,
        "<line x1=\"{m:.1}\" y1=\"{m:.1}\" x2=\"{m:.1}\" y2=\"{b:.1}\" stroke=\"black\"/><line x1=\"{m:.1}\" y1=\"{b:.1}\" x2=\"{r:.1}\" y2=\"{b:.1}\" stroke=\"black\"/>",
        m = margin,
        b = margin + plot_h,
        r = margin + plot_w
    );

    for (i, (group, p)) in proportions.iter().enumerate() {
        let bar_h = p.clamp(0.0, 1.0) * plot_h;
        let x = margin + i as f64 * slot + (slot - bar_w) / 2.0;
        let y = margin + plot_h - bar_h;
        let _ = write!(
            svg,
            "<rect x=\"{x:.1}\" y=\"{y:.1}\" width=\"{bar_w:.1}\" height=\"{bar_h:.1}\" fill=\"steelblue\"><title>{}: {p:.4}</title></rect>",
            escape(&group.to_string())
        );
        let _ = write!(
            svg,
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"11\">{}</text>",
            x + bar_w / 2.0,
            margin + plot_h + 14.0,
            escape(&group.to_string())
        );
    }
    svg.push_str("</svg>");
    Some(svg)
}

fn has_signal(proportions: &GroupProportions) -> bool {
    proportions.values().any(|p| *p > 0.0)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
