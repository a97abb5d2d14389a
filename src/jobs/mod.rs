pub mod metric_poll_sync;
