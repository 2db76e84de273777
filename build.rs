fn main() {
    // Device builds export the ESP-IDF toolchain paths produced by
    // esp-idf-sys; host builds need no environment.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}
