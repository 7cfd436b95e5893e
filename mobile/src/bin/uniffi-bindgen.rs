// Generates Kotlin/Swift bindings from the compiled library:
//   cargo run -p trustprobe-mobile --features gen-bindings --bin uniffi-bindgen -- \
//     generate --library target/release/libtrustprobe_mobile.so --language kotlin --out-dir out

fn main() {
    uniffi::uniffi_bindgen_main()
}
