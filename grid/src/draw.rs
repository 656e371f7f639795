use cgmath::Point3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const RED: Color = Color::new(1., 0., 0.);
    pub const GREEN: Color = Color::new(0., 1., 0.);
    pub const BLUE: Color = Color::new(0., 0., 1.);
    pub const YELLOW: Color = Color::new(1., 1., 0.);
    pub const VIOLET: Color = Color::new(0.93, 0.51, 0.93);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b }
    }
}

/// Receives debug geometry in world space. Drawing never influences query results.
pub trait DebugDraw {
    /// Draws a marker at `position` whose size is `scale` times the host's default marker size.
    fn draw_point(&mut self, position: Point3<f64>, scale: f64, color: Color);

    fn draw_line(&mut self, from: Point3<f64>, to: Point3<f64>, color: Color, thickness: f64);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Point {
        position: Point3<f64>,
        scale: f64,
        color: Color,
    },
    Line {
        from: Point3<f64>,
        to: Point3<f64>,
        color: Color,
        thickness: f64,
    },
}

/// Keeps every primitive it is asked to draw.
#[derive(Debug, Clone, Default)]
pub struct RecordingDraw {
    pub commands: Vec<DrawCommand>,
}

impl RecordingDraw {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> impl Iterator<Item = (Point3<f64>, Color)> + '_ {
        self.commands.iter().filter_map(|command| match *command {
            DrawCommand::Point {
                position, color, ..
            } => Some((position, color)),
            DrawCommand::Line { .. } => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = (Point3<f64>, Point3<f64>, Color)> + '_ {
        self.commands.iter().filter_map(|command| match *command {
            DrawCommand::Line {
                from, to, color, ..
            } => Some((from, to, color)),
            DrawCommand::Point { .. } => None,
        })
    }
}

impl DebugDraw for RecordingDraw {
    fn draw_point(&mut self, position: Point3<f64>, scale: f64, color: Color) {
        self.commands.push(DrawCommand::Point {
            position,
            scale,
            color,
        });
    }

    fn draw_line(&mut self, from: Point3<f64>, to: Point3<f64>, color: Color, thickness: f64) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            thickness,
        });
    }
}
