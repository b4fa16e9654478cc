use confique::{yaml::FormatOptions, Config as _};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Confique(#[from] confique::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not determine config dir parent path")]
    ParentPath,

    #[error(transparent)]
    Xdg(#[from] xdg::BaseDirectoriesError),
}

#[derive(Clone, Debug, Serialize, Deserialize, confique::Config)]
pub struct Config {
    /// Address to listen on
    #[config(default = "127.0.0.1:3000", env = "BASEPLATE_LISTEN")]
    pub listen: String,

    /// Base64 encoded session key, at least 64 bytes once decoded
    #[config(env = "BASEPLATE_SESSION_KEY")]
    pub session_key: Option<String>,

    /// Locale used when the request does not send Accept-Language
    #[config(default = "en")]
    pub default_locale: String,

    /// Longest allowed chain of templates extending one another
    #[config(default = 8)]
    pub max_chain_depth: usize,

    /// Static assets
    #[config(nested)]
    pub assets: AssetsConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize, confique::Config)]
pub struct AssetsConfig {
    /// URL prefix local assets are served under
    #[config(default = "/static/")]
    pub static_url: String,

    /// Directory local assets are served from
    #[config(default = "static")]
    pub static_dir: PathBuf,

    /// Stylesheets, in load order
    #[config(default = [
        "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css",
        "https://cdn.jsdelivr.net/npm/bootstrap-icons@1.11.3/font/bootstrap-icons.min.css",
        "css/style.css"
    ])]
    pub stylesheets: Vec<String>,

    /// Deferred vendor scripts, in execution order
    #[config(default = [
        "https://unpkg.com/htmx.org@1.9.12",
        "https://unpkg.com/htmx.org@1.9.12/dist/ext/ws.js",
        "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/js/bootstrap.bundle.min.js",
        "https://cdn.jsdelivr.net/npm/alpinejs@3.14.1/dist/cdn.min.js"
    ])]
    pub deferred_scripts: Vec<String>,

    /// Project scripts, loaded after the vendor scripts
    #[config(default = ["js/main.js"])]
    pub local_scripts: Vec<String>,
}

impl Config {
    pub fn load(config_path: Option<PathBuf>) -> Result<Config> {
        let config_path = get_config_path(config_path)?;
        let config = Config::builder().env().file(config_path).load()?;

        Ok(config)
    }

    /// Defaults and environment only, no config file.
    pub fn from_env() -> Result<Config> {
        Ok(Config::builder().env().load()?)
    }
}

pub fn init_config(config_path: Option<PathBuf>) -> Result<()> {
    // @TODO this will overwrite an existing config with no warning.
    let config_path = write_config_template(config_path)?;

    println!("Configuration file created: {}", config_path.display());

    Ok(())
}

pub fn get_config_template() -> String {
    confique::yaml::template::<Config>(FormatOptions::default())
}

pub fn print_config_template() {
    println!("{}", get_config_template());
}

pub fn get_config_path(config_path: Option<PathBuf>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path),
        None => {
            let xdg_dirs = xdg::BaseDirectories::with_prefix("baseplate")?;
            Ok(xdg_dirs.get_config_file("config.yml"))
        }
    }
}

pub fn write_config_template(config_path: Option<PathBuf>) -> Result<PathBuf> {
    let config_path = get_config_path(config_path)?;
    let config_template = get_config_template();

    let config_path_dir = config_path.parent().ok_or(Error::ParentPath)?;

    std::fs::create_dir_all(config_path_dir)?;
    std::fs::write(config_path.clone(), config_template)?;

    Ok(config_path)
}
