//! A build script to install the C interface to `cubage`

use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=include/cubage.h");
    println!("cargo:rerun-if-env-changed=CARGO_C_CUBAGE_INSTALL_PREFIX");

    if let Ok(prefix) = env::var("CARGO_C_CUBAGE_INSTALL_PREFIX") {
        let prefix_path = PathBuf::from(prefix);
        let include_path = prefix_path.join("include").join("cubage_capi");

        fs::create_dir_all(&include_path)?;

        let source_header = PathBuf::from("include/cubage.h");
        let dest_header = include_path.join("cubage.h");

        fs::copy(&source_header, &dest_header)?;
    }
    Ok(())
}
