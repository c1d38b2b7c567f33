use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{error::Error, fs, path::PathBuf};

use crate::display::SceneGeometry;
use crate::parallax::Motion;

pub const DEFAULT_SETTINGS_PATH: &str = "resources/Settings.toml";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Output {
    pub format: OutputFormat,
    pub directory: PathBuf,
}

impl Default for Output {
    fn default() -> Output {
        Output {
            format: OutputFormat::Svg,
            directory: PathBuf::from("resources/frames"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Scrollable height of the container driving the scene
    pub container_height: f64,
    /// Number of evenly spaced offsets to render when none are given
    pub frames: u32,
    pub motion: Motion,
    pub scene: SceneGeometry,
    pub output: Output,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            container_height: 1000.0,
            frames: 11,
            motion: Motion::default(),
            scene: SceneGeometry::default(),
            output: Output::default(),
        }
    }
}

pub fn load_config<T>(path: &str) -> Result<T, Box<dyn Error>>
where
    T: DeserializeOwned,
{
    let rawdata = fs::read_to_string(path)
        .map_err(|err| simple_error::SimpleError::new(format!("{1} Filename {0}:", path, err)))?;

    parse_config(&rawdata)
        .map_err(|err| simple_error::SimpleError::new(format!("{1} Filename {0}:", path, err)).into())
}

pub fn parse_config<T>(rawdata: &str) -> Result<T, Box<dyn Error>>
where
    T: DeserializeOwned,
{
    let result = toml::from_str(rawdata)?;

    Ok(result)
}
