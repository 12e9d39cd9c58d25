//! Headless симуляция TAGALONG
//!
//! Рекрутирует компаньона-воина рядом с монстром и forage, гоняет fixed тики
//! и печатает состояние AI.

use bevy::prelude::*;
use tagalong_simulation::ai::{CompanionHud, RecruitCompanion};
use tagalong_simulation::*;

fn main() {
    let seed = 42;
    println!("Starting TAGALONG headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin::default());

    let world = app.world_mut();
    let leader = world
        .spawn((
            Leader,
            WorldPosition::new(0.0, 0.0),
            Location::new("Farm"),
            Health::with_current(25, 100),
        ))
        .id();
    let companion = world
        .spawn((
            Companion::new("Abigail").with_skills([skills::WARRIOR, skills::FORAGER]),
            WorldPosition::new(1.0, 0.0),
            Location::new("Farm"),
            Loadout::with_weapon(Weapon::sword("Silver Saber", 8)),
        ))
        .id();
    world.spawn((Hostile, WorldPosition::new(5.0, 2.0), Location::new("Farm")));
    world.spawn((
        Forageable {
            item: ForageItem::new("Leek"),
        },
        WorldPosition::new(-3.0, 1.0),
        Location::new("Farm"),
    ));
    world.send_event(RecruitCompanion { companion, leader });

    // 1200 тиков = 20 сек при 60Hz
    for tick in 0..1200 {
        run_fixed_ticks(&mut app, 1);

        if tick % 100 == 0 {
            let hud = app.world().resource::<CompanionHud>();
            let position = app.world().get::<WorldPosition>(companion).map(|p| p.0);
            println!(
                "Tick {}: state {:?}, position {:?}, {} entities",
                tick,
                hud.state_of(companion),
                position,
                app.world().entities().len()
            );
        }
    }

    println!("Simulation complete!");
}
