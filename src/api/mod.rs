mod config;
mod coordinates;
mod input;
mod labels;
mod layout;
mod navigation;
mod plot;
mod render_dispatcher;
mod view_state;

pub use config::{
    DEFAULT_UPDATE_DELAY_MS, DEFAULT_ZOOM_BOX_DELAY_MS, MIN_UPDATE_DELAY_MS, XyPlotConfig,
};
pub use coordinates::{screen_to_value_x, value_to_screen, value_to_screen_x, value_to_screen_y};
pub use input::{MIN_MOVE_DETECT_SIZE, MIN_ZOOM_RECT_SIZE};
pub use layout::{AxisFrame, ButtonMetrics, ClickAreas};
pub use navigation::{MOVES_PER_SCREEN, PAN_OVERSCROLL_PX, ZOOM_IN_FACTOR};
pub use plot::XyPlot;
pub use render_dispatcher::{POINT_DISTANCE_FOR_CIRCLES, RepaintKind};
pub use view_state::ViewState;
