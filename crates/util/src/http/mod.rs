pub mod http_path_resolution;
pub mod parser;

pub use http_path_resolution::build_path;
pub use parser::parse_response_body;
