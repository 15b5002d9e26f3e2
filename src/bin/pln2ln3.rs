use std::{env::args_os, io, path::PathBuf, process};

use pln2ln3::{
    convert::{convert_file, ConvertError},
    route::ReduceLimits,
};
use tracing::{error, info};

fn main() {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let args: Vec<PathBuf> = args_os().skip(1).map(PathBuf::from).collect();
    let [source, output_dir] = args.as_slice() else {
        error!(
            "{}",
            ConvertError::InvalidArguments {
                expected: 2,
                got: args.len(),
            }
        );
        process::exit(-1);
    };

    match convert_file(source, output_dir, &ReduceLimits::default()) {
        Ok(path) => info!("converted {} to {}", source.display(), path.display()),
        Err(e) => {
            error!("{e}");
            process::exit(-1);
        }
    }
}
