use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    ln3::{self, Ln3},
    pln::{parse_pln, PlnError},
    route::{reduce_route, ReduceLimits},
};

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("usage: pln2ln3 <plan.pln> <output-dir> (expected {expected} arguments, got {got})")]
    InvalidArguments { expected: usize, got: usize },
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("failed to read file: {0}")]
    FileRead(#[source] io::Error),
    #[error(".pln: {0}")]
    Pln(#[from] PlnError),
    #[error("no waypoints in {0}")]
    NoWaypoints(String),
    #[error("failed to write {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type ConvertResult<T> = Result<T, ConvertError>;

/// Parses and reduces a plan, ready to be written.
pub fn convert(title: &str, content: &[u8], limits: &ReduceLimits) -> ConvertResult<Ln3> {
    let route = parse_pln(content)?;
    if route.is_empty() {
        return Err(ConvertError::NoWaypoints(title.to_string()));
    }
    if route.len() > limits.max_waypoints {
        info!(
            "{title}: too many waypoints: {}, max {}",
            route.len(),
            limits.max_waypoints
        );
    }

    Ok(Ln3 {
        title: title.to_string(),
        route: reduce_route(&route, limits),
    })
}

fn read_source(source: &Path) -> ConvertResult<Vec<u8>> {
    fs_err::read(source).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            ConvertError::FileNotFound(source.to_path_buf())
        } else {
            ConvertError::FileRead(e)
        }
    })
}

// written to a sibling first, then renamed into place
fn write_atomically(path: &Path, contents: &str) -> io::Result<()> {
    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs_err::write(&tmp, contents)
        .and_then(|()| fs_err::rename(&tmp, path))
        .inspect_err(|_| {
            if let Err(e) = fs_err::remove_file(&tmp) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("{e}");
                }
            }
        })
}

/// Converts `source` into `<output_dir>/<source stem>.ln3` and returns the
/// written path.
pub fn convert_file(
    source: &Path,
    output_dir: &Path,
    limits: &ReduceLimits,
) -> ConvertResult<PathBuf> {
    let content = read_source(source)?;
    let ln3 = convert(&ln3::title(source), &content, limits)?;
    let path = ln3::output_path(source, output_dir);
    write_atomically(&path, &ln3.to_string()).map_err(|e| ConvertError::FileWrite {
        path: path.clone(),
        source: e,
    })?;
    info!("wrote {} stations to {}", ln3.route.len(), path.display());

    Ok(path)
}
