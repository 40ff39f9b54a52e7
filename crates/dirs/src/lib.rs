use directories::ProjectDirs;
use std::path::PathBuf;
use std::sync::OnceLock;

pub struct Dirs;

impl Dirs {
    /// Project directory specifically for livepad.
    ///
    /// The config file lives there.
    pub fn project() -> &'static ProjectDirs {
        static CELL: OnceLock<ProjectDirs> = OnceLock::new();

        CELL.get_or_init(|| {
            ProjectDirs::from("org", "livepad", "livepad")
                .expect("Couldn't create project directory for livepad")
        })
    }

    /// Default location of `config.toml`.
    ///
    /// - Linux: ~/.config/livepad/config.toml
    /// - macOS: ~/Library/Application Support/org.livepad.livepad/config.toml
    /// - Windows: ~\AppData\Roaming\livepad\livepad\config\config.toml
    pub fn config_file() -> PathBuf {
        Self::project().config_dir().join("config.toml")
    }
}
