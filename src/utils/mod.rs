pub mod constants;
pub mod string_utils;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{is_internal_href, normalize_path, same_target, split_suffix};
