pub mod gesture;
pub mod map_state;
pub mod view;
pub mod viewport;

pub use gesture::{PendingClick, PointerGesture};
pub use map_state::{MapAction, MapState};
pub use view::View;
pub use viewport::Viewport;
