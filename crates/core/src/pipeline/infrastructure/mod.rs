pub mod threaded_monitor_executor;
