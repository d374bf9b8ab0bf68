use std::env;

/// Pulls `--target <triple>` out of the arguments so every target gets its own build directory,
/// then hands the rest to nih_plug's bundler.
fn main() -> nih_plug_xtask::Result<()> {
    let args: Vec<String> = env::args().collect();

    if let Some(pos) = args.iter().position(|arg| arg == "--target") {
        if let Some(target) = args.get(pos + 1) {
            env::set_var("CARGO_TARGET_DIR", format!("target/{target}"));
        }
    }

    nih_plug_xtask::main()
}
