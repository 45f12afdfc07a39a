// Runtime tuning, read from a RON file.
//
// Both knobs are optional:
//
//   (
//       stack: 524288,   // managed-stack depth in words
//       trace: false,    // disassemble each instruction to stderr
//   )

use ron::de::from_reader;
use serde::Deserialize;
use std::fs::File;

use crate::vm::DEFAULT_STACK;


#[derive(Deserialize, Debug, Copy, Clone)]
#[serde(default)]
pub struct Config {
    pub stack: usize,
    pub trace: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            stack: DEFAULT_STACK,
            trace: false,
        }
    }
}

pub type ConfigResult = std::result::Result<Config, String>;

pub fn load(path: &str) -> ConfigResult {
    let file = File::open(path).map_err(|e| e.to_string())?;
    from_reader(file).map_err(|e| e.to_string())
}
