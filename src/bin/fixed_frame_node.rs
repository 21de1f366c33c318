use anyhow::{Error, Result};
use fixed_frame_core::geodesy::GeodeticCoordinate;
use fixed_frame_core::localization::{
    LocalizationStack, VehicleState, DEFAULT_REFERENCE, DEFAULT_UTM_ZONE,
};
use fixed_frame_core::FixedFrameCore;
use rclrs::{
    Context, CreateBasicExecutor, Node, RclrsErrorFilter, SpinOptions, QOS_PROFILE_DEFAULT,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// Import the message types directly from the crates
use builtin_interfaces::msg::Time;
use geometry_msgs::msg::{Quaternion, TransformStamped, Vector3};
use nav_msgs::msg::Odometry;
use sensor_msgs::msg::NavSatFix;
use std_msgs::msg::Header;
use tf2_msgs::msg::TFMessage;

struct FixedFrameNode {
    core: Mutex<FixedFrameCore>,
    node: Arc<Node>,
    state_publisher: Arc<rclrs::Publisher<Odometry>>,
    frame_publisher: Arc<rclrs::Publisher<TFMessage>>,
    static_frame_publisher: Arc<rclrs::Publisher<TFMessage>>,
    gps_subscription: Mutex<Option<Arc<rclrs::Subscription<NavSatFix>>>>,
}

impl FixedFrameNode {
    pub fn new(executor: &rclrs::Executor, name: &str) -> Result<Arc<Self>, rclrs::RclrsError> {
        // Create a node using the executor
        let node = executor.create_node(name)?;

        // Create the core
        let mut core = FixedFrameCore::new();

        // Default parameters
        let reference_latitude = DEFAULT_REFERENCE.latitude;
        let reference_longitude = DEFAULT_REFERENCE.longitude;
        let utm_zone = f64::from(DEFAULT_UTM_ZONE);
        let show_frame = true;
        let gps_topic = "/gps/filtered".to_string();
        let state_topic = "/fixedgps/state".to_string();

        // Print parameter values
        println!(
            "Using parameters: reference_latitude={}, reference_longitude={}, utm_zone={}, show_frame={}",
            reference_latitude, reference_longitude, utm_zone, show_frame
        );
        println!("Topics: gps={}, state={}", gps_topic, state_topic);

        // Create the localization stack anchored at the reference point
        let mut localization_stack = LocalizationStack::new();

        let mut params = HashMap::new();
        params.insert("reference_latitude".to_string(), reference_latitude);
        params.insert("reference_longitude".to_string(), reference_longitude);
        params.insert("utm_zone".to_string(), utm_zone);

        if let Err(e) = localization_stack.configure(&params) {
            eprintln!("Failed to configure localization stack: {}", e);
        }
        localization_stack.set_publish_frame_transform(show_frame);

        // Register components
        core.register(localization_stack);

        // Initialize the core
        if let Err(e) = core.init() {
            eprintln!("Failed to initialize core: {}", e);
        }

        println!("Core initialized successfully!");

        // Create publisher for the vehicle state
        let state_publisher =
            node.create_publisher::<Odometry>(&state_topic, QOS_PROFILE_DEFAULT)?;

        // Create publishers for the frame transforms
        let frame_publisher = node.create_publisher::<TFMessage>("/tf", QOS_PROFILE_DEFAULT)?;
        let static_frame_publisher = node
            .create_publisher::<TFMessage>("/tf_static", QOS_PROFILE_DEFAULT.transient_local())?;

        let fixed_frame_node = Arc::new(FixedFrameNode {
            core: Mutex::new(core),
            node,
            state_publisher,
            frame_publisher,
            static_frame_publisher,
            gps_subscription: None.into(),
        });

        // Anchor the local frame in the UTM grid, once at startup
        fixed_frame_node.publish_anchor_frame();

        // Set up the GPS subscription
        let fixed_frame_node_clone = Arc::clone(&fixed_frame_node);
        let gps_subscription = fixed_frame_node
            .node
            .create_subscription::<NavSatFix, _>(
                &gps_topic,
                QOS_PROFILE_DEFAULT,
                move |msg: NavSatFix| {
                    fixed_frame_node_clone.gps_callback(msg);
                },
            )?;

        *fixed_frame_node.gps_subscription.lock().unwrap() = Some(gps_subscription);

        Ok(fixed_frame_node)
    }

    fn now(&self) -> Time {
        let now = self.node.get_clock().now();
        let nanoseconds = now.nsec;
        Time {
            sec: (nanoseconds / 1_000_000_000) as i32,
            nanosec: (nanoseconds % 1_000_000_000) as u32,
        }
    }

    /// Publish the static transform from the UTM grid to the local frame
    fn publish_anchor_frame(&self) {
        let mut core = self.core.lock().unwrap();
        if let Some(stack) = core.localization_stack_mut() {
            let anchor = match stack.anchor() {
                Some(anchor) => anchor,
                None => {
                    eprintln!("No anchor transform available, skipping static frame");
                    return;
                }
            };

            let mut transform = TransformStamped::default();
            transform.header = Header {
                stamp: self.now(),
                frame_id: "utm".to_string(),
            };
            transform.child_frame_id = "fixed_gps".to_string();
            transform.transform.translation = Vector3 {
                x: anchor.easting,
                y: anchor.northing,
                z: 0.0,
            };
            transform.transform.rotation = Quaternion {
                x: 0.0,
                y: 0.0,
                z: 0.0,
                w: 1.0,
            };

            let message = TFMessage {
                transforms: vec![transform],
            };

            if let Err(e) = self.static_frame_publisher.publish(&message) {
                eprintln!("Failed to publish anchor frame: {}", e);
            } else {
                println!(
                    "Published anchor frame at easting={:.3}, northing={:.3}",
                    anchor.easting, anchor.northing
                );
            }
        }
    }

    fn gps_callback(&self, msg: NavSatFix) {
        let measured = match GeodeticCoordinate::new(msg.latitude, msg.longitude) {
            Ok(coordinate) => coordinate,
            Err(e) => {
                eprintln!("Dropping GPS fix: {}", e);
                return;
            }
        };

        let mut core = self.core.lock().unwrap();
        if let Some(stack) = core.localization_stack_mut() {
            let state = match stack.vehicle_state(&measured) {
                Ok(state) => state,
                Err(e) => {
                    eprintln!("Dropping GPS fix: {}", e);
                    return;
                }
            };

            self.publish_state(&msg, &state);

            if stack.publish_frame_transform() {
                self.publish_frame(&msg, &state);
            }
        }
    }

    fn publish_state(&self, fix: &NavSatFix, state: &VehicleState) {
        let mut odometry = Odometry::default();
        odometry.header = Header {
            stamp: fix.header.stamp.clone(),
            frame_id: "fixed_gps".to_string(),
        };
        odometry.child_frame_id = "base_link_fixed_gps".to_string();
        odometry.pose.pose.position.x = state.x;
        odometry.pose.pose.position.y = state.y;
        // Yaw and velocity are always zero, covariance stays zeroed
        odometry.pose.pose.orientation.w = 1.0;

        if let Err(e) = self.state_publisher.publish(&odometry) {
            eprintln!("Failed to publish vehicle state: {}", e);
        }
    }

    fn publish_frame(&self, fix: &NavSatFix, state: &VehicleState) {
        let mut transform = TransformStamped::default();
        transform.header = Header {
            stamp: fix.header.stamp.clone(),
            frame_id: "fixed_gps".to_string(),
        };
        transform.child_frame_id = "base_link_fixed_gps".to_string();
        transform.transform.translation = Vector3 {
            x: state.x,
            y: state.y,
            z: 0.0,
        };
        transform.transform.rotation = Quaternion {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        };

        let message = TFMessage {
            transforms: vec![transform],
        };

        if let Err(e) = self.frame_publisher.publish(&message) {
            eprintln!("Failed to publish frame transform: {}", e);
        }
    }
}

fn main() -> Result<(), Error> {
    println!("Initializing Fixed Frame Node...");

    // Create the ROS 2 context and executor
    let mut executor = Context::default_from_env()?.create_basic_executor();

    // Create the fixed-frame node with the correct name
    let _fixed_frame_node = FixedFrameNode::new(&executor, "fixed_frame_node")?;

    println!("Fixed Frame Node initialized. Starting to spin...");
    println!("To use with parameters: ros2 run fixed_frame_core fixed_frame_node --ros-args --params-file /path/to/fixed_frame_core/config/fixed_frame_params.yaml");

    // Spin the executor to process callbacks
    executor
        .spin(SpinOptions::default())
        .first_error()
        .map_err(|err| err.into())
}
