// uvcctl/examples/camera_controls.rs
//
// Opens camera 0, prints the supported properties with their ranges,
// then nudges Brightness and restores it.

use uvcctl::prelude::*;
use uvcctl::{device_capabilities, open_camera_by_index, VidProp};

fn main() -> Result<()> {
    let camera = open_camera_by_index(0)?;
    println!("Opened: {}", camera.device());

    let caps = device_capabilities(camera.device())?;
    println!("Accessible: {}", caps.accessible);

    println!("\nCamera controls:");
    for prop in caps.supported_camera_properties() {
        let cap = caps.camera_capability(prop).unwrap();
        println!(
            "  {prop:<22} [{}, {}] step {} default {} ({})",
            cap.range.min, cap.range.max, cap.range.step, cap.range.default_val, cap.current.mode
        );
    }

    println!("\nVideo controls:");
    for prop in caps.supported_video_properties() {
        let cap = caps.video_capability(prop).unwrap();
        println!(
            "  {prop:<22} [{}, {}] step {} current {} ({})",
            cap.range.min, cap.range.max, cap.range.step, cap.current.value, cap.current.mode
        );
    }

    // Nudge brightness toward the middle of its range, then restore.
    if caps.supports_video_property(VidProp::Brightness) {
        let range = camera.get_video_range(VidProp::Brightness)?;
        let before = camera.get_video(VidProp::Brightness)?;
        let target = range.clamp((range.min + range.max) / 2);
        println!("\nBrightness {} -> {target}", before.value);

        camera.set_video(VidProp::Brightness, PropSetting::new(target, CamMode::Manual))?;
        let read_back = camera.get_video(VidProp::Brightness)?;
        println!("Read back: {} ({})", read_back.value, read_back.mode);

        camera.set_video(VidProp::Brightness, before)?;
        println!("Restored.");
    }

    Ok(())
}
