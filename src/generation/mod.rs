//! Point generation, motion and triangulation
//!
//! The geometry kernel of the crate: random point placement for a rectangular
//! field, the per-point wandering motion, and a Bowyer-Watson Delaunay
//! triangulator that turns the moving point set into triangles every frame.

mod delaunay;
mod motion;
mod points;

pub use delaunay::{circumcircle, contains, triangulate, Circumcircle, Triangulator, EPSILON};
pub use motion::{pick_motion, AnimatedVertex, MotionState};
pub use points::{border_points, interior_points, BORDER_POINT_COUNT, BORDER_ROUNDS};
