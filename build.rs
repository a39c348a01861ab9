fn main() {
    // Only the ESP-IDF target needs the toolchain environment exported by
    // esp-idf-sys; host builds (simulator + tests) skip it.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}
