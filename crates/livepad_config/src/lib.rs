use dirs::Dirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

static CONFIG: OnceLock<ConfigInner> = OnceLock::new();

#[derive(Debug)]
struct ConfigInner {
    config: Config,
    file_path: PathBuf,
}

struct LoadedConfig {
    config: Config,
    file_path: PathBuf,
    maybe_error: Option<toml::de::Error>,
}

fn load_config(specified_config_file: Option<PathBuf>) -> LoadedConfig {
    let config_file = specified_config_file.unwrap_or_else(Dirs::config_file);

    let mut maybe_config_err = None;
    let config = std::fs::read_to_string(&config_file)
        .and_then(|contents| {
            toml::from_str(&contents).map_err(|err| {
                maybe_config_err.replace(err);
                std::io::Error::new(std::io::ErrorKind::Other, "Error occurred in config.toml")
            })
        })
        .unwrap_or_default();

    LoadedConfig {
        config,
        file_path: config_file,
        maybe_error: maybe_config_err,
    }
}

/// Loads the config file once for the whole process.
///
/// A missing file yields the default config, an invalid file yields the default
/// config together with the parse error so that the caller can report it.
pub fn load_config_on_startup(
    specified_config_file: Option<PathBuf>,
) -> (&'static Config, Option<toml::de::Error>) {
    let mut maybe_error = None;

    let inner = CONFIG.get_or_init(|| {
        let LoadedConfig {
            config,
            file_path,
            maybe_error: err,
        } = load_config(specified_config_file);
        maybe_error = err;
        ConfigInner { config, file_path }
    });

    (&inner.config, maybe_error)
}

/// Path of the config file picked by [`load_config_on_startup`], if it ran.
pub fn config_file() -> Option<&'static PathBuf> {
    CONFIG.get().map(|inner| &inner.file_path)
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct LogConfig {
    /// Specify the log file path.
    ///
    /// This path must be an absolute path. Logs go to stderr when unset.
    pub log_file: Option<String>,

    /// Specify the max log level.
    pub max_level: String,

    /// Specify the log target to enable more detailed logging.
    ///
    /// Particularly useful for the debugging purpose.
    ///
    /// ```toml
    /// [log]
    /// log-target = "livepad_core::sync=trace,livepad_server=debug"
    /// ```
    pub log_target: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            max_level: "debug".into(),
            log_target: "".into(),
        }
    }
}

/// Preview server.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address the server binds to.
    pub host: String,

    /// Port the server listens on, `0` picks a free one.
    pub port: u16,

    /// Whether to open the playground in the default browser on startup.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            open_browser: true,
        }
    }
}

/// Presentation options shared by the three editor panes.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct EditorConfig {
    pub line_numbers: bool,

    pub auto_close_tags: bool,

    pub auto_close_brackets: bool,

    /// CodeMirror theme name.
    pub theme: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            line_numbers: true,
            auto_close_tags: true,
            auto_close_brackets: true,
            theme: "panda-syntax".into(),
        }
    }
}

/// Render target settings.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct PreviewConfig {
    /// Identifier of the single managed stylesheet node.
    pub stylesheet_id: String,

    /// Script loaded into the head of the preview document on startup.
    ///
    /// Defaults to the paged.js polyfill, an empty string disables it.
    pub polyfill_url: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            stylesheet_id: "live-preview-style".into(),
            polyfill_url: "https://unpkg.com/pagedjs/dist/paged.legacy.polyfill.js".into(),
        }
    }
}

impl PreviewConfig {
    pub fn polyfill_url(&self) -> Option<&str> {
        let url = self.polyfill_url.trim();
        (!url.is_empty()).then_some(url)
    }
}

/// Initial pane heights in pixels.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub code_height: i32,

    pub preview_height: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            code_height: 300,
            preview_height: 400,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Log configuration.
    pub log: LogConfig,

    /// Server configuration.
    pub server: ServerConfig,

    /// Editor configuration.
    pub editor: EditorConfig,

    /// Preview configuration.
    pub preview: PreviewConfig,

    /// Layout configuration.
    pub layout: LayoutConfig,
}
