//! Headless ASCII demo driver: runs the simulation core and prints each
//! frame to stdout, the way `Nopey-sand`'s `main` drove its `Board`.

use cellsim::events::{ConfigurableEventGenerator, EmptyConfig, SandboxConfig};
use cellsim::{EventGenerator, ScenarioConfig, World};

fn print_frame(world: &World) {
    let (width, height) = world.dimensions();
    for y in 0..height {
        let row = world.row_debug(y);
        let line: String = row.iter().map(|c| c.material.display_char()).collect();
        println!("{line}");
    }
}

fn main() {
    env_logger::init();

    let scenario = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sandbox".to_string());

    let config = match scenario.as_str() {
        "empty" => ScenarioConfig::Empty(EmptyConfig {}),
        "sandbox" => ScenarioConfig::Sandbox(SandboxConfig::default()),
        other => {
            log::warn!("unknown scenario '{other}', falling back to sandbox");
            ScenarioConfig::Sandbox(SandboxConfig::default())
        }
    };

    let mut world = World::new(40, 30, 0xC0FFEE);
    let mut generator = ConfigurableEventGenerator::new(config);
    generator.setup(&mut world);

    let dt = 1.0 / 60.0;
    loop {
        print_frame(&world);
        world.step(&mut generator, dt);
        std::thread::sleep(std::time::Duration::from_millis(50));
        println!("------");
    }
}
