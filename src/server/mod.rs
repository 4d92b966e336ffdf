pub mod http;

pub const DEFAULT_PORT: &str = "7878";
