// uvcctl/examples/hotplug_watch.rs
//
// Watches for camera arrivals/removals for thirty seconds.

use std::time::Duration;

use uvcctl::monitor::{register_device_change_callback, unregister_device_change_callback};
use uvcctl::prelude::*;

fn main() -> Result<()> {
    register_device_change_callback(Box::new(|added, path| {
        if added {
            println!("added:   {path}");
        } else {
            println!("removed: {path}");
        }
    }))?;

    println!("Watching for device changes (30s)...");
    std::thread::sleep(Duration::from_secs(30));

    unregister_device_change_callback();
    Ok(())
}
