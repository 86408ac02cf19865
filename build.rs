#![allow(clippy::indexing_slicing, clippy::exit, clippy::unwrap_used)]
fn main() {
    if std::env::var("PROFILE").unwrap_or_default() == "release" {
        println!("cargo:rustc-env=DEFMT_LOG=off");
    }

    linker_hints();
    println!("cargo:rustc-link-arg=-Tdefmt.x");
    println!("cargo:rustc-link-arg=-Tlinkall.x");
}

/// Re-invoked by the linker as its error-handling script; prints a hint for
/// the undefined symbols that usually mean a missing linker script or logger.
fn linker_hints() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 2 {
        let hint = match (args[1].as_str(), args[2].as_str()) {
            ("undefined-symbol", "_defmt_timestamp" | "_defmt_write") => Some(
                "`defmt` has no global logger: link `defmt.x` and keep `use esp_println as _;` in the binary",
            ),
            ("undefined-symbol", "_stack_start") => Some("Is the linker script `linkall.x` missing?"),
            ("undefined-symbol", _) => None,
            _ => std::process::exit(1),
        };
        if let Some(hint) = hint {
            eprintln!();
            eprintln!("hint: {hint}");
            eprintln!();
        }
        std::process::exit(0);
    }

    println!(
        "cargo:rustc-link-arg=-Wl,--error-handling-script={}",
        std::env::current_exe().unwrap().display()
    );
}
