use fixed_frame_core::geodesy::GeodeticCoordinate;
use fixed_frame_core::localization::LocalizationStack;
use fixed_frame_core::FixedFrameCore;
use std::collections::HashMap;

fn main() {
    println!("Initializing Fixed Frame Core...");

    let mut core = FixedFrameCore::new();

    // Create a localization stack with the default reference point
    let mut localization_stack = LocalizationStack::new();

    // Configure the stack
    let mut params = HashMap::new();
    params.insert("reference_latitude".to_string(), 59.350791);
    params.insert("reference_longitude".to_string(), 18.067825);
    params.insert("utm_zone".to_string(), 34.0);

    if let Err(e) = localization_stack.configure(&params) {
        println!("Failed to configure localization stack: {}", e);
    }

    // Register components
    core.register(localization_stack);

    // Initialize the core
    match core.init() {
        Ok(_) => println!("Core initialized successfully!"),
        Err(e) => {
            println!("Failed to initialize core: {}", e);
            return;
        }
    }

    if let Some(stack) = core.localization_stack_mut() {
        println!("Reference point: {:?}", stack.reference());

        match stack.anchor() {
            Some(anchor) => println!(
                "UTM anchor: easting={:.3}, northing={:.3}",
                anchor.easting, anchor.northing
            ),
            None => println!("No anchor computed"),
        }

        // Project a fix a short distance due east of the reference
        let measured = match GeodeticCoordinate::new(59.350791, 18.077825) {
            Ok(coordinate) => coordinate,
            Err(e) => {
                println!("Invalid measured coordinate: {}", e);
                return;
            }
        };

        match stack.vehicle_state(&measured) {
            Ok(state) => println!(
                "Vehicle state: x={:.3}, y={:.3}, yaw={}, velocity={}",
                state.x, state.y, state.yaw, state.velocity
            ),
            Err(e) => println!("Failed to compute vehicle state: {}", e),
        }
    }

    // Shutdown the core
    match core.shutdown() {
        Ok(_) => println!("Core shutdown successfully!"),
        Err(e) => println!("Failed to shutdown core: {}", e),
    }
}
