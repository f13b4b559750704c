//! Screen port: the imperative paint step

use crate::domain::entities::Notice;
use crate::render::BoardView;

pub trait Screen: Send {
    /// Redraw everything from a fully projected view
    fn paint(&mut self, view: &BoardView);

    /// Show a transient notification
    fn notify(&mut self, notice: &Notice);
}
