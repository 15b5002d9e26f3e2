use std::ffi::OsString;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::Route;

pub const EXTENSION: &str = "ln3";

/// TF-104G waypoint file: a title comment followed by one `[STATIONn]` block
/// per waypoint.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Ln3 {
    pub title: String,
    pub route: Route,
}

impl Display for Ln3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "# {}", self.title)?;
        writeln!(f)?;
        for (index, wpt) in self.route.iter().enumerate() {
            writeln!(f, "[STATION{}]", index + 1)?;
            writeln!(f, "{{")?;
            writeln!(f, "LAT: {:.6};", wpt.coordinate.y())?;
            writeln!(f, "LON: {:.6};", wpt.coordinate.x())?;
            writeln!(f, "NAME: \"{}\";", wpt.name)?;
            writeln!(f, "ALT: {};", wpt.altitude)?;
            writeln!(f, "}}")?;
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Title of the converted plan, the source file name without extension.
pub fn title(source: &Path) -> String {
    source
        .file_stem()
        .unwrap_or(source.as_os_str())
        .to_string_lossy()
        .into_owned()
}

/// `<output_dir>/<source stem>.ln3`
pub fn output_path(source: &Path, output_dir: &Path) -> PathBuf {
    let mut file_name = OsString::from(source.file_stem().unwrap_or(source.as_os_str()));
    file_name.push(".");
    file_name.push(EXTENSION);
    output_dir.join(file_name)
}
