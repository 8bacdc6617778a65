pub mod frame_coordinator;
pub mod infrastructure;
pub mod monitor_executor;
pub mod status_listener;
pub mod watch_session_use_case;
