fn main() {
    let target_env = std::env::var("CARGO_CFG_TARGET_ENV").unwrap_or_default();
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_default();
    let def_file = std::path::Path::new(&manifest_dir).join("d3d9.def");

    println!("cargo:rerun-if-changed={}", def_file.display());
    if target_os != "windows" {
        return;
    }
    match target_env.as_str() {
        "msvc" => {
            println!("cargo:rustc-link-arg=/DEF:{}", def_file.display());
        }
        "gnu" => {
            println!("cargo:rustc-link-arg={}", def_file.display());
        }
        _ => {}
    }
}
