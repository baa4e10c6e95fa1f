//! Goal management. One goal per user, replaced or cleared as a whole.

pub mod model;
pub mod routes;

pub use model::{
    GoalAction, GoalCommand, GoalForm, GoalOutcome, MAX_DESCRIPTION_CHARS, apply_goal,
    decide_goal_action,
};
pub use routes::{GoalRouteState, goal_routes};
