use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Host builds (simulator, tests) need nothing from here
    let target = env::var("TARGET").unwrap_or_default();
    if !target.contains("avr") {
        return;
    }

    // Configure for ATmega128RFA1
    println!("cargo:rustc-link-arg=-mmcu=atmega128rfa1");

    println!("cargo:warning=Building for ATmega128RFA1 at 16MHz");
}
