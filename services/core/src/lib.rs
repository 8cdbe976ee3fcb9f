pub mod ddb;
pub mod endpoint_error;
pub mod operation_error;
pub mod telemetry;
