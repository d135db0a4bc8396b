use crate::utils::constants::{ORDER_SEGMENT, SOURCE_FILE_EXTENSION};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Geographic area a series is published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "UK")]
    Uk,
    England,
    Wales,
    Scotland,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Uk,
        Region::England,
        Region::Wales,
        Region::Scotland,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Uk => "UK",
            Region::England => "England",
            Region::Wales => "Wales",
            Region::Scotland => "Scotland",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measured climate variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Parameter {
    Tmax,
    Tmin,
    Tmean,
    Sunshine,
    Rainfall,
}

impl Parameter {
    pub const ALL: [Parameter; 5] = [
        Parameter::Tmax,
        Parameter::Tmin,
        Parameter::Tmean,
        Parameter::Sunshine,
        Parameter::Rainfall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Parameter::Tmax => "Tmax",
            Parameter::Tmin => "Tmin",
            Parameter::Tmean => "Tmean",
            Parameter::Sunshine => "Sunshine",
            Parameter::Rainfall => "Rainfall",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One published series, identified by region and parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceFile {
    pub region: Region,
    pub parameter: Parameter,
}

impl SourceFile {
    pub fn new(region: Region, parameter: Parameter) -> Self {
        Self { region, parameter }
    }

    /// Every series in run order: regions outermost, parameters innermost
    pub fn all() -> Vec<SourceFile> {
        Region::ALL
            .iter()
            .flat_map(|&region| {
                Parameter::ALL
                    .iter()
                    .map(move |&parameter| SourceFile::new(region, parameter))
            })
            .collect()
    }

    /// Cache file name, e.g. `England_Tmax.txt`
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}.{}",
            self.region, self.parameter, SOURCE_FILE_EXTENSION
        )
    }

    pub fn local_path(&self, cache_dir: &Path) -> PathBuf {
        cache_dir.join(self.file_name())
    }

    /// Archive URL, e.g. `{base}Tmax/date/England.txt`
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}{}{}{}.{}",
            base_url, self.parameter, ORDER_SEGMENT, self.region, SOURCE_FILE_EXTENSION
        )
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.region, self.parameter)
    }
}
