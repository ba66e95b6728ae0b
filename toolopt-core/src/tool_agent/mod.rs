//! Tool-use agent: the step loop and the trajectories it records.

mod react_agent;
mod trajectory;

pub use react_agent::{normalize_tool_name, AgentState, ReActAgent};
pub use trajectory::{value_to_answer, Demo, Prediction, Trajectory, TrajectoryStep};
