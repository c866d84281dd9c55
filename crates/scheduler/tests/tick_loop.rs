//! End-to-end tick loop: scheduler, game and a recording surface together.

use std::ops::ControlFlow;
use std::time::Duration;

use glam::DVec2;
use walkabout_common::Surface;
use walkabout_input::InputState;
use walkabout_render::{DrawCommand, RecordingSurface, SoftwareCanvas};
use walkabout_scheduler::{Clock, DemoConfig, Game, ManualClock, Scheduler};

fn config() -> DemoConfig {
    DemoConfig::default()
}

fn scheduler(cfg: &DemoConfig) -> Scheduler<ManualClock> {
    Scheduler::new(ManualClock::new(), cfg.fixed_rate().unwrap())
}

#[test]
fn held_right_key_walks_east_and_items_drift_left() {
    let cfg = config();
    let mut game = Game::from_config(&cfg).unwrap();
    let mut surface = RecordingSurface::new(800, 600);
    game.prepare_surface(&mut surface);

    let mut input = InputState::new();
    input.press("ArrowRight");

    let mut first_item_x = Vec::new();
    let ran = scheduler(&cfg).run(Some(30), |now| {
        surface.take_commands();
        let report = game.run_tick(now, &input, &mut surface);
        assert_eq!(report.animation, "walk_east");
        first_item_x.push(surface.filled_rects()[0].x);
        ControlFlow::Continue(())
    });

    assert_eq!(ran, 30);
    assert_eq!(game.world().player(), DVec2::new(30.0, 0.0));
    for pair in first_item_x.windows(2) {
        assert_eq!(pair[1], pair[0] - 1.0);
    }
}

#[test]
fn releasing_keys_returns_to_idle() {
    let cfg = config();
    let mut game = Game::from_config(&cfg).unwrap();
    let mut surface = RecordingSurface::new(800, 600);
    let mut input = InputState::new();

    let mut tick = 0u32;
    scheduler(&cfg).run(Some(20), |now| {
        if tick == 10 {
            input.release("ArrowRight");
        } else if tick == 0 {
            input.press("ArrowRight");
        }
        game.run_tick(now, &input, &mut surface);
        tick += 1;
        ControlFlow::Continue(())
    });

    assert_eq!(game.player().current_animation(), Some("idle"));
    assert_eq!(game.world().player(), DVec2::new(10.0, 0.0));
}

#[test]
fn frame_index_stays_in_range_across_switches() {
    let cfg = config();
    let mut game = Game::from_config(&cfg).unwrap();
    let mut surface = RecordingSurface::new(800, 600);
    let mut input = InputState::new();
    let keys = ["d", "s", "a", "w"];

    let mut tick = 0usize;
    scheduler(&cfg).run(Some(240), |now| {
        if tick % 17 == 0 {
            input.clear();
            if tick % 34 == 0 {
                input.press(keys[(tick / 17) % keys.len()]);
            }
        }
        let report = game.run_tick(now, &input, &mut surface);
        let count = game
            .player()
            .animation(report.animation)
            .map(|a| a.frame_count)
            .unwrap();
        assert!(report.frame_index < count, "{report:?}");
        assert!(report.draw_error.is_none());
        tick += 1;
        ControlFlow::Continue(())
    });
}

#[test]
fn walk_frames_advance_on_wall_clock() {
    let cfg = config();
    let mut game = Game::from_config(&cfg).unwrap();
    let mut surface = RecordingSurface::new(800, 600);
    let mut input = InputState::new();
    input.press("s");

    // 0.15 s per walk frame at 60 Hz: a change roughly every ten ticks.
    let mut changes = 0;
    let mut last = game.player().frame_index();
    scheduler(&cfg).run(Some(60), |now| {
        let report = game.run_tick(now, &input, &mut surface);
        if report.frame_index != last {
            changes += 1;
            last = report.frame_index;
        }
        ControlFlow::Continue(())
    });
    assert!((5..=7).contains(&changes), "changes = {changes}");
}

#[test]
fn resize_mid_run_keeps_smoothing_off() {
    let cfg = config();
    let mut game = Game::from_config(&cfg).unwrap();
    let mut canvas = SoftwareCanvas::new(1, 1);
    game.prepare_surface(&mut canvas);
    assert_eq!(canvas.size(), (800, 600));
    assert!(!canvas.smoothing());

    let input = InputState::new();
    let mut tick = 0;
    scheduler(&cfg).run(Some(6), |now| {
        if tick == 3 {
            game.request_resize(640, 480);
        }
        game.run_tick(now, &input, &mut canvas);
        assert!(!canvas.smoothing());
        tick += 1;
        ControlFlow::Continue(())
    });
    assert_eq!(canvas.size(), (640, 480));
    assert_eq!(game.stats().resizes, 1);
}

#[test]
fn canvas_shows_player_at_center() {
    let cfg = config();
    let mut game = Game::from_config(&cfg).unwrap();
    let mut canvas = SoftwareCanvas::new(800, 600);
    game.prepare_surface(&mut canvas);
    game.run_tick(Duration::ZERO, &InputState::new(), &mut canvas);

    let center = canvas.pixel(400, 300).unwrap();
    assert_eq!(center.a, 255, "player sprite should cover the center");
    // Far corner is empty: no item reaches it with the default layout.
    assert_eq!(canvas.pixel(0, 599).unwrap().a, 0);
}

#[test]
fn stalls_only_run_bounded_catch_up() {
    let cfg = config();
    let mut rate = cfg.fixed_rate().unwrap();
    let mut clock = ManualClock::new();
    assert_eq!(rate.due(clock.now()), 1);
    clock.advance(Duration::from_secs(2));
    assert_eq!(
        rate.due(clock.now()),
        cfg.max_catch_up_ticks
    );
}

#[test]
fn resize_is_first_command_of_its_tick() {
    let cfg = config();
    let mut game = Game::from_config(&cfg).unwrap();
    let mut surface = RecordingSurface::new(800, 600);
    game.request_resize(300, 200);
    game.run_tick(Duration::ZERO, &InputState::new(), &mut surface);
    assert_eq!(
        surface.commands()[0],
        DrawCommand::Resize {
            width: 300,
            height: 200
        }
    );
    assert_eq!(surface.commands()[2], DrawCommand::Clear);
}
