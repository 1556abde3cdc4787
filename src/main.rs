#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    landmark_map::main();
}
