//! SVG output for sheet layouts

use std::fmt::Write;

use super::{Rect, SheetConfig, SheetLayout};

/// Render a laid-out sheet as a standalone SVG document
pub(super) fn render(layout: &SheetLayout, config: &SheetConfig) -> String {
    let mut svg = String::new();
    let _ = writeln!(svg, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}mm\" height=\"{h}mm\" viewBox=\"0 0 {w} {h}\" font-family=\"Helvetica, Arial, sans-serif\" font-size=\"{f}\">",
        w = config.width_mm,
        h = config.height_mm,
        f = config.font_size_mm,
    );
    let _ = writeln!(svg, "  <title>{}</title>", xml_escape(&layout.title));
    let _ = writeln!(
        svg,
        "  <desc>template: {}</desc>",
        xml_escape(&layout.template)
    );

    write_rect(&mut svg, "border", &layout.border, 0.7);

    let line = config.font_size_mm * 1.4;
    let tb = &layout.title_block;
    let _ = writeln!(svg, "  <g class=\"title-block\">");
    write_rect(&mut svg, "title-frame", tb, 0.5);
    write_text(&mut svg, tb.x + line, tb.y + 1.5 * line, &layout.title, true);
    write_text(
        &mut svg,
        tb.x + line,
        tb.y + 2.7 * line,
        &layout.template,
        false,
    );
    let _ = writeln!(svg, "  </g>");

    for frame in &layout.frames {
        let _ = writeln!(
            svg,
            "  <g class=\"view\" id=\"view-{}\">",
            xml_escape(&frame.heading)
        );
        write_rect(&mut svg, "view-frame", &frame.rect, 0.25);
        let x = frame.rect.x + line;
        let mut y = frame.rect.y + 1.5 * line;
        write_text(&mut svg, x, y, &frame.heading, true);
        for text in &frame.lines {
            y += line;
            write_text(&mut svg, x, y, text, false);
        }
        let _ = writeln!(svg, "  </g>");
    }

    svg.push_str("</svg>\n");
    svg
}

fn write_rect(svg: &mut String, class: &str, r: &Rect, stroke: f64) {
    let _ = writeln!(
        svg,
        "  <rect class=\"{class}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"black\" stroke-width=\"{stroke}\"/>",
        r.x, r.y, r.width, r.height
    );
}

fn write_text(svg: &mut String, x: f64, y: f64, text: &str, bold: bool) {
    let weight = if bold { " font-weight=\"bold\"" } else { "" };
    let _ = writeln!(
        svg,
        "    <text x=\"{x}\" y=\"{y}\"{weight}>{}</text>",
        xml_escape(text)
    );
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::sheet::Frame;
    use crate::renderer::ViewId;

    #[test]
    fn test_svg_escapes_text() {
        let layout = SheetLayout {
            title: "Bracket <rev A>".into(),
            template: "A4 & border.svg".into(),
            border: Rect::new(10.0, 10.0, 277.0, 190.0),
            title_block: Rect::new(10.0, 180.0, 277.0, 20.0),
            frames: vec![Frame {
                view: ViewId::new(),
                rect: Rect::new(10.0, 10.0, 277.0, 170.0),
                heading: "\"FRONT\"".into(),
                lines: vec!["Diameter Ø5".into()],
            }],
        };
        let svg = render(&layout, &SheetConfig::default());

        assert!(svg.contains("<title>Bracket &lt;rev A&gt;</title>"));
        assert!(svg.contains("A4 &amp; border.svg"));
        assert!(svg.contains("id=\"view-&quot;FRONT&quot;\""));
        assert!(svg.contains(">Diameter Ø5</text>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
