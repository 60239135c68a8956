use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::render::{Color, TextHAlign};

/// Rectangular clip region in the parent's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRect {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupElement {
    pub translate_x: f64,
    pub translate_y: f64,
    pub clip: Option<ClipRect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Color,
    pub corner_radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    CubicTo {
        c1x: f64,
        c1y: f64,
        c2x: f64,
        c2y: f64,
        x: f64,
        y: f64,
    },
    Close,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathElement {
    pub commands: Vec<PathCommand>,
    pub stroke: Option<Color>,
    pub fill: Option<Color>,
    pub stroke_width: f64,
}

impl PathElement {
    /// SVG path data (`d` attribute).
    #[must_use]
    pub fn svg_data(&self) -> String {
        let mut data = String::new();
        for command in &self.commands {
            if !data.is_empty() {
                data.push(' ');
            }
            // Writing into a String cannot fail.
            let _ = match *command {
                PathCommand::MoveTo { x, y } => write!(data, "M{x:.2},{y:.2}"),
                PathCommand::LineTo { x, y } => write!(data, "L{x:.2},{y:.2}"),
                PathCommand::CubicTo {
                    c1x,
                    c1y,
                    c2x,
                    c2y,
                    x,
                    y,
                } => write!(data, "C{c1x:.2},{c1y:.2},{c2x:.2},{c2y:.2},{x:.2},{y:.2}"),
                PathCommand::Close => write!(data, "Z"),
            };
        }
        data
    }

    /// Number of `MoveTo` commands, i.e. disjoint stretches of the path.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, PathCommand::MoveTo { .. }))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleElement {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub fill: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineElement {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke: Color,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub h_align: TextHAlign,
    pub font_size_px: f64,
    pub color: Color,
}

/// A visual element bound to one keyed node of the scene tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    Group(GroupElement),
    Rect(RectElement),
    Path(PathElement),
    Circle(CircleElement),
    Line(LineElement),
    Text(TextElement),
}

impl Element {
    #[must_use]
    pub fn group(translate_x: f64, translate_y: f64) -> Self {
        Self::Group(GroupElement {
            translate_x,
            translate_y,
            clip: None,
        })
    }

    #[must_use]
    pub fn as_rect(&self) -> Option<&RectElement> {
        match self {
            Self::Rect(rect) => Some(rect),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_path(&self) -> Option<&PathElement> {
        match self {
            Self::Path(path) => Some(path),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_circle(&self) -> Option<&CircleElement> {
        match self {
            Self::Circle(circle) => Some(circle),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&TextElement> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_group(&self) -> Option<&GroupElement> {
        match self {
            Self::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Rejects geometry no backend can draw: non-finite coordinates or
    /// negative sizes.
    pub fn validate(&self) -> ChartResult<()> {
        let finite = |values: &[f64], what: &str| {
            if values.iter().all(|value| value.is_finite()) {
                Ok(())
            } else {
                Err(ChartError::InvalidData(format!(
                    "{what} coordinates must be finite"
                )))
            }
        };

        match self {
            Self::Group(group) => {
                finite(&[group.translate_x, group.translate_y], "group")?;
                if let Some(clip) = group.clip {
                    finite(&[clip.width, clip.height], "clip")?;
                }
                Ok(())
            }
            Self::Rect(rect) => {
                finite(&[rect.x, rect.y, rect.width, rect.height], "rect")?;
                if rect.width < 0.0 || rect.height < 0.0 {
                    return Err(ChartError::InvalidData(
                        "rect size must be >= 0".to_owned(),
                    ));
                }
                rect.fill.validate()
            }
            Self::Path(path) => {
                for command in &path.commands {
                    match *command {
                        PathCommand::MoveTo { x, y } | PathCommand::LineTo { x, y } => {
                            finite(&[x, y], "path")?;
                        }
                        PathCommand::CubicTo {
                            c1x,
                            c1y,
                            c2x,
                            c2y,
                            x,
                            y,
                        } => finite(&[c1x, c1y, c2x, c2y, x, y], "path")?,
                        PathCommand::Close => {}
                    }
                }
                if let Some(stroke) = path.stroke {
                    stroke.validate()?;
                }
                if let Some(fill) = path.fill {
                    fill.validate()?;
                }
                Ok(())
            }
            Self::Circle(circle) => {
                finite(&[circle.cx, circle.cy, circle.radius], "circle")?;
                circle.fill.validate()
            }
            Self::Line(line) => {
                finite(&[line.x1, line.y1, line.x2, line.y2], "line")?;
                line.stroke.validate()
            }
            Self::Text(text) => {
                finite(&[text.x, text.y], "text")?;
                text.color.validate()
            }
        }
    }
}
