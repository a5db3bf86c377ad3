use serde::{Deserialize, Serialize};

/// Semantic foreground colors the backend resolves to concrete colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForegroundRole {
    Axis,
    Grid,
    Cursor,
    Button,
}

/// Semantic background colors the backend resolves to concrete colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackgroundRole {
    Background,
    PlotBackground,
    LegendBackground,
    LegendSelected,
    CursorBackground,
    ButtonBackground,
    ButtonDisabled,
}

/// Colors a host may override through the plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorRole {
    Background,
    PlotBackground,
    Axis,
    Cursor,
    CursorBackground,
}

/// Fixed set of button icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonGlyph {
    Down,
    Up,
    ZoomUp,
    ZoomDown,
    Left,
    Right,
    Plus,
    Minus,
    Start,
    Stop,
    Clear,
    Pause,
    Pos1,
    End,
    SaveCurve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrokeStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontWeight {
    Normal,
    Bold,
}
