// uvcctl/examples/list_devices.rs

use uvcctl::prelude::*;

fn main() -> Result<()> {
    let devices = list_devices()?;
    if devices.is_empty() {
        println!("No video input devices found.");
        return Ok(());
    }

    println!("Found {} device(s):", devices.len());
    for (index, device) in devices.iter().enumerate() {
        println!("  [{index}] {}", device.name);
        println!("       path: {}", device.path);
        let connected = is_device_connected(device)?;
        println!("       connected: {connected}");
    }

    Ok(())
}
