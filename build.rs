use std::env;
use std::path::{Path, PathBuf};

const WATCHED_VARIABLES: [&str; 4] = [
    "FFMPEG_DIR",
    "VCPKG_ROOT",
    "VCPKGRS_DYNAMIC",
    "VCPKGRS_TRIPLET",
];

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    // ffmpeg-next finds FFmpeg through pkg-config everywhere except Windows.
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }
    if env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    match vcpkg_install_dir() {
        None => println!(
            "cargo:warning=framesift needs FFmpeg. On Windows, install it with vcpkg and point FFMPEG_DIR at the installed triplet."
        ),
        Some(directory) if directory.exists() => hint_vcpkg_install(&directory),
        Some(directory) => println!(
            "cargo:warning=VCPKG_ROOT is set, but {} does not exist.",
            directory.display()
        ),
    }
}

fn vcpkg_install_dir() -> Option<PathBuf> {
    let root = env::var_os("VCPKG_ROOT")?;
    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    Some(PathBuf::from(root).join("installed").join(triplet))
}

fn hint_vcpkg_install(directory: &Path) {
    println!(
        "cargo:warning=Found FFmpeg under {0}; set FFMPEG_DIR={0} to use it explicitly.",
        directory.display()
    );
    if env::var_os("VCPKGRS_DYNAMIC").is_none() {
        println!("cargo:warning=Set VCPKGRS_DYNAMIC=1 if the vcpkg FFmpeg build is dynamic.");
    }
}
