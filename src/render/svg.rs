//! SVG export of a retained scene.

use std::fmt::Write as _;

use crate::core::Viewport;
use crate::render::{Color, Element, SceneNode, SceneTree, TextHAlign};

/// Serializes a scene tree into a standalone SVG document.
///
/// Clip regions become `<clipPath>` definitions referenced by their group.
#[must_use]
pub fn render_svg(tree: &SceneTree, viewport: Viewport) -> String {
    let mut writer = SvgWriter::default();
    for node in tree.values() {
        writer.node(node);
    }

    let mut document = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">",
        viewport.width, viewport.height, viewport.width, viewport.height
    );
    if !writer.defs.is_empty() {
        document.push_str("<defs>");
        document.push_str(&writer.defs);
        document.push_str("</defs>");
    }
    document.push_str(&writer.body);
    document.push_str("</svg>");
    document
}

#[derive(Default)]
struct SvgWriter {
    defs: String,
    body: String,
    clip_ids: usize,
}

impl SvgWriter {
    fn node(&mut self, node: &SceneNode) {
        // Writing into a String cannot fail.
        let _ = self.element(&node.element);
        if let Element::Group(_) = node.element {
            for child in node.children.values() {
                self.node(child);
            }
            self.body.push_str("</g>");
        }
    }

    fn element(&mut self, element: &Element) -> std::fmt::Result {
        match element {
            Element::Group(group) => {
                write!(
                    self.body,
                    "<g transform=\"translate({:.2},{:.2})\"",
                    group.translate_x, group.translate_y
                )?;
                if let Some(clip) = group.clip {
                    self.clip_ids += 1;
                    let id = format!("clip-{}", self.clip_ids);
                    write!(
                        self.defs,
                        "<clipPath id=\"{id}\"><rect x=\"0\" y=\"0\" width=\"{:.2}\" height=\"{:.2}\"/></clipPath>",
                        clip.width, clip.height
                    )?;
                    write!(self.body, " clip-path=\"url(#{id})\"")?;
                }
                self.body.push('>');
            }
            Element::Rect(rect) => {
                write!(
                    self.body,
                    "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\"",
                    rect.x, rect.y, rect.width, rect.height
                )?;
                if rect.corner_radius > 0.0 {
                    write!(self.body, " rx=\"{:.2}\"", rect.corner_radius)?;
                }
                write!(self.body, "{}/>", fill_attrs(rect.fill))?;
            }
            Element::Path(path) => {
                write!(self.body, "<path d=\"{}\"", path.svg_data())?;
                match path.fill {
                    Some(fill) => write!(self.body, "{}", fill_attrs(fill))?,
                    None => self.body.push_str(" fill=\"none\""),
                }
                if let Some(stroke) = path.stroke {
                    write!(
                        self.body,
                        " stroke=\"{}\" stroke-width=\"{:.2}\"",
                        stroke.to_hex(),
                        path.stroke_width
                    )?;
                }
                self.body.push_str("/>");
            }
            Element::Circle(circle) => {
                write!(
                    self.body,
                    "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\"{}/>",
                    circle.cx,
                    circle.cy,
                    circle.radius,
                    fill_attrs(circle.fill)
                )?;
            }
            Element::Line(line) => {
                write!(
                    self.body,
                    "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{:.2}\"/>",
                    line.x1,
                    line.y1,
                    line.x2,
                    line.y2,
                    line.stroke.to_hex(),
                    line.stroke_width
                )?;
            }
            Element::Text(text) => {
                let anchor = match text.h_align {
                    TextHAlign::Left => "start",
                    TextHAlign::Center => "middle",
                    TextHAlign::Right => "end",
                };
                write!(
                    self.body,
                    "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{anchor}\" font-size=\"{:.1}\" fill=\"{}\">{}</text>",
                    text.x,
                    text.y,
                    text.font_size_px,
                    text.color.to_hex(),
                    escape_xml(&text.text)
                )?;
            }
        }
        Ok(())
    }
}

fn fill_attrs(color: Color) -> String {
    if color.alpha >= 1.0 {
        format!(" fill=\"{}\"", Color { alpha: 1.0, ..color }.to_hex())
    } else {
        format!(
            " fill=\"{}\" fill-opacity=\"{:.3}\"",
            Color { alpha: 1.0, ..color }.to_hex(),
            color.alpha
        )
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::{escape_xml, render_svg};
    use crate::core::Viewport;
    use crate::render::{
        ClipRect, Color, Element, ElementKey, GroupElement, Layer, RectElement, SceneNode,
    };

    #[test]
    fn clipped_group_emits_clip_path() {
        let rect = Element::Rect(RectElement {
            x: 1.0,
            y: 2.0,
            width: 3.0,
            height: 4.0,
            fill: Color::rgb(1.0, 0.0, 0.0),
            corner_radius: 2.0,
        });
        let mut children = IndexMap::new();
        children.insert(ElementKey::Series("a".to_owned()), SceneNode::leaf(rect));
        let group = Element::Group(GroupElement {
            translate_x: 50.0,
            translate_y: 36.0,
            clip: Some(ClipRect {
                width: 100.0,
                height: 80.0,
            }),
        });
        let mut tree = IndexMap::new();
        tree.insert(
            ElementKey::Layer(Layer::Columns),
            SceneNode::with_children(group, children),
        );

        let svg = render_svg(&tree, Viewport::new(200, 150));
        assert!(svg.contains("<clipPath id=\"clip-1\">"));
        assert!(svg.contains("clip-path=\"url(#clip-1)\""));
        assert!(svg.contains("rx=\"2.00\" fill=\"#ff0000\""));
        assert!(svg.ends_with("</g></svg>"));
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
