mod grpc;

pub use grpc::*;
