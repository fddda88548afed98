use crate::consts::DEFAULT_MAX_COMMENT_SIZE;
use crate::util::{path_to_string, make_absolute};
use crate::zip::ZipOptions;

#[derive(Debug, Clone)]
pub struct FsConfig {
    /// Absolute base that relative virtual paths are resolved against.
    pub base_path: String,
    /// Load `X.gwa` next to `X.wad` when it exists.
    pub load_gwa_companions: bool,
    pub max_comment_size: u64,
}

impl FsConfig {
    pub fn with_base_path(base_path: impl AsRef<str>) -> Self {
        FsConfig {
            base_path: absolute_base(base_path.as_ref()),
            ..FsConfig::default()
        }
    }

    pub(crate) fn zip_options(&self) -> ZipOptions {
        ZipOptions {
            base_path:        self.base_path.clone(),
            max_comment_size: self.max_comment_size,
        }
    }
}

fn current_dir() -> String {
    std::env::current_dir()
        .map(path_to_string)
        .unwrap_or_else(|_| "/".to_owned())
}

fn absolute_base(base_path: &str) -> String {
    make_absolute(&current_dir(), base_path)
}

impl Default for FsConfig {
    fn default() -> Self {
        FsConfig {
            base_path:           absolute_base("."),
            load_gwa_companions: true,
            max_comment_size:    DEFAULT_MAX_COMMENT_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_base_is_made_absolute() {
        let config = FsConfig::with_base_path("/games/doom/../heretic");
        assert_eq!(config.base_path, "/games/heretic");
        assert!(config.load_gwa_companions);
        assert_eq!(config.zip_options().max_comment_size, 2048);

        let config = FsConfig::with_base_path("data");
        assert!(config.base_path.ends_with("/data"));
    }
}
