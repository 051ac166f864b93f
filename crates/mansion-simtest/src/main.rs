//! Mansion Headless Generation Harness
//!
//! Loads the bundled room catalogue, runs the generator under both collision
//! strategies and checks the results. Runs entirely in-process.
//!
//! Usage:
//!   cargo run -p mansion-simtest
//!   cargo run -p mansion-simtest -- --verbose
//!   cargo run -p mansion-simtest -- --seed 7 --json

use log::LevelFilter;
use mansion_core::catalogue::Catalogue;
use mansion_core::config::{validate_config, CollisionStrategy, GenerationConfig};
use mansion_core::doorway::{doorways_compatible, Doorway};
use mansion_core::geometry::{segments_intersect, TangentMode, Vec2};
use mansion_core::persistence::{load_layout, save_layout};
use mansion_core::placement::{generate_mansion, MansionLayout};
use mansion_core::validation::{validate_layout, Severity};
use simple_logger::SimpleLogger;

// ── Room catalogue (same JSON the tests use) ────────────────────────────
const CATALOGUE_JSON: &str = include_str!("../../../data/room_catalogue.json");

const DEFAULT_SEED: u64 = 42;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    json: bool,
    seed: u64,
}

fn parse_options() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let seed = args
        .iter()
        .position(|a| a == "--seed")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);
    Options {
        verbose: args.iter().any(|a| a == "--verbose"),
        json: args.iter().any(|a| a == "--json"),
        seed,
    }
}

fn main() {
    let options = parse_options();
    let level = if options.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("logger init failed: {}", e);
    }

    println!("=== Mansion Generation Harness (seed {}) ===\n", options.seed);

    let mut results = Vec::new();

    // 1. Room catalogue validation
    let catalogue = validate_catalogue(&mut results, options.verbose);

    // 2. Geometry and doorway sanity
    results.extend(validate_geometry());

    // 3. Generation under each strategy
    let mut layouts = Vec::new();
    if let Some(catalogue) = &catalogue {
        for strategy in [CollisionStrategy::Polygon, CollisionStrategy::Grid] {
            let (checks, layout) =
                validate_generation(catalogue, strategy, options.seed, options.verbose);
            results.extend(checks);
            layouts.extend(layout);
        }
    }

    // 4. Save/load
    if let Some(layout) = layouts.first() {
        results.extend(validate_persistence(layout));
    }

    if options.json {
        if let Some(layout) = layouts.first() {
            print_layout_json(layout);
        }
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || options.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn harness_config(seed: u64, collision: CollisionStrategy) -> GenerationConfig {
    GenerationConfig {
        seed: Some(seed),
        floor_count: 3,
        rooms_per_floor: vec![20, 12, 8],
        collision,
        ..Default::default()
    }
}

// ── 1. Room Catalogue ───────────────────────────────────────────────────

fn validate_catalogue(results: &mut Vec<TestResult>, verbose: bool) -> Option<Catalogue> {
    println!("--- Room Catalogue ---");
    let config = GenerationConfig::default();

    let catalogue = match Catalogue::from_json(CATALOGUE_JSON, &config.boundary) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "catalogue_parse".into(),
                passed: false,
                detail: e.to_string(),
            });
            return None;
        }
    };

    results.push(TestResult {
        name: "catalogue_templates_valid".into(),
        passed: catalogue.rejected().is_empty(),
        detail: if catalogue.rejected().is_empty() {
            format!("{} templates built", catalogue.len())
        } else {
            catalogue
                .rejected()
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        },
    });

    let doorless: Vec<_> = catalogue
        .prefabs()
        .iter()
        .filter(|p| p.floors[0].doorways.is_empty())
        .map(|p| p.name.as_str())
        .collect();
    results.push(TestResult {
        name: "catalogue_floor0_doors".into(),
        passed: doorless.is_empty(),
        detail: if doorless.is_empty() {
            "every template can be attached".into()
        } else {
            format!("no floor-0 doorway: {}", doorless.join(", "))
        },
    });

    let open_loops = catalogue
        .prefabs()
        .iter()
        .flat_map(|p| &p.floors)
        .filter(|f| f.collision_loop.first() != f.collision_loop.last())
        .count();
    results.push(TestResult {
        name: "catalogue_loops_closed".into(),
        passed: open_loops == 0,
        detail: format!("{} open collision loops", open_loops),
    });

    if verbose {
        for prefab in catalogue.prefabs() {
            for floor in &prefab.floors {
                println!(
                    "  {} floor {}: {} loop points, {} doorways, {} partial cells",
                    prefab.name,
                    floor.index,
                    floor.collision_loop.len(),
                    floor.doorways.len(),
                    floor.partial_cells.len()
                );
                for row in floor.grid.dump().lines() {
                    println!("    {}", row);
                }
            }
        }
    }

    Some(catalogue)
}

// ── 2. Geometry ─────────────────────────────────────────────────────────

fn validate_geometry() -> Vec<TestResult> {
    println!("--- Geometry ---");
    let mut results = Vec::new();
    let v = Vec2::new;

    let cases = [
        (v(0.0, 0.0), v(1.0, 1.0), v(0.0, 1.0), v(1.0, 0.0)),
        (v(0.0, 0.0), v(1.0, 1.0), v(1.0, 1.0), v(2.0, 0.0)),
        (v(-1.0, 0.5), v(3.0, 0.5), v(0.2, 0.0), v(0.9, 2.0)),
        (v(0.0, 0.0), v(2.0, 0.0), v(1.0, 0.0), v(3.0, 0.0)),
    ];
    let asymmetric = cases
        .iter()
        .flat_map(|c| [(c, TangentMode::Inclusive), (c, TangentMode::Exclusive)])
        .filter(|((a1, a2, b1, b2), mode)| {
            segments_intersect(*a1, *a2, *b1, *b2, *mode)
                != segments_intersect(*b1, *b2, *a1, *a2, *mode)
        })
        .count();
    results.push(TestResult {
        name: "geometry_intersection_symmetric".into(),
        passed: asymmetric == 0,
        detail: format!("{} asymmetric cases", asymmetric),
    });

    let shared = (v(0.0, 0.0), v(1.0, 1.0), v(1.0, 1.0), v(2.0, 0.0));
    let (a1, a2, b1, b2) = shared;
    let inclusive = segments_intersect(a1, a2, b1, b2, TangentMode::Inclusive);
    let exclusive = segments_intersect(a1, a2, b1, b2, TangentMode::Exclusive);
    results.push(TestResult {
        name: "geometry_shared_endpoint_policy".into(),
        passed: inclusive && !exclusive,
        detail: format!("inclusive={} exclusive={}", inclusive, exclusive),
    });

    let east = Doorway::derive(0, v(0.0, 0.0), v(1.0, 0.0));
    let north = Doorway::derive(0, v(0.0, 0.0), v(0.0, 1.0));
    results.push(TestResult {
        name: "doorway_angles".into(),
        passed: (east.angle - 90.0).abs() < 1e-3 && (north.angle - 180.0).abs() < 1e-3,
        detail: format!("(1,0) → {:.3}°, (0,1) → {:.3}°", east.angle, north.angle),
    });

    let facing = Doorway::derive(0, v(1.0, 0.0), v(0.0, 0.0));
    results.push(TestResult {
        name: "doorway_compatibility".into(),
        passed: doorways_compatible(&east, &facing, 1.0)
            && !doorways_compatible(&east, &north, 1.0),
        detail: "opposite doors match, perpendicular doors do not".into(),
    });

    results
}

// ── 3. Generation ───────────────────────────────────────────────────────

fn validate_generation(
    catalogue: &Catalogue,
    strategy: CollisionStrategy,
    seed: u64,
    verbose: bool,
) -> (Vec<TestResult>, Option<MansionLayout>) {
    let tag = match strategy {
        CollisionStrategy::Polygon => "polygon",
        CollisionStrategy::Grid => "grid",
    };
    println!("--- Generation ({}) ---", tag);
    let mut results = Vec::new();
    let config = harness_config(seed, strategy);

    let config_errors = validate_config(&config);
    results.push(TestResult {
        name: format!("{}_config_valid", tag),
        passed: config_errors.is_empty(),
        detail: format!("{} config errors", config_errors.len()),
    });

    let layout = match generate_mansion(catalogue, &config) {
        Ok(layout) => layout,
        Err(e) => {
            results.push(TestResult {
                name: format!("{}_generate", tag),
                passed: false,
                detail: e.to_string(),
            });
            return (results, None);
        }
    };

    let requested: u32 = config.rooms_per_floor.iter().sum();
    results.push(TestResult {
        name: format!("{}_room_accounting", tag),
        passed: layout.stats.placed + layout.stats.discarded == requested
            && layout.rooms.len() as u32 == layout.stats.placed,
        detail: format!(
            "{} placed + {} discarded of {} requested",
            layout.stats.placed, layout.stats.discarded, requested
        ),
    });

    // Only a floor's first room may stay unjoined, and it sits at the origin
    let stray = layout
        .rooms
        .iter()
        .filter(|r| r.floors.iter().all(|f| f.closed.is_empty()))
        .filter(|r| r.position != Some(Vec2::ZERO))
        .count();
    results.push(TestResult {
        name: format!("{}_doorways_consumed", tag),
        passed: stray == 0 && layout.closed_doorway_count() % 2 == 0,
        detail: format!(
            "{} closed, {} still open, {} unjoined off-origin rooms",
            layout.closed_doorway_count(),
            layout.open_doorway_count(),
            stray
        ),
    });

    let again = generate_mansion(catalogue, &config).ok();
    results.push(TestResult {
        name: format!("{}_deterministic", tag),
        passed: again.is_some_and(|l| l.positions() == layout.positions()),
        detail: format!("seed {} reproduces {} positions", layout.seed, layout.rooms.len()),
    });

    let findings = validate_layout(&layout, &config);
    let errors = findings.iter().filter(|f| f.severity == Severity::Error).count();
    let warnings = findings.len() - errors;
    results.push(TestResult {
        name: format!("{}_layout_validation", tag),
        passed: errors == 0,
        detail: format!("{} errors, {} warnings", errors, warnings),
    });

    if verbose {
        for f in &findings {
            println!("  [{:?}] {}: {}", f.severity, f.category, f.message);
        }
        for report in &layout.floors {
            println!(
                "  floor {}: {}/{} placed",
                report.floor, report.placed, report.requested
            );
        }
        println!("  stats: {:?}", layout.stats);
    }

    (results, Some(layout))
}

// ── 4. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(layout: &MansionLayout) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut buffer = Vec::new();
    let outcome = save_layout(&mut buffer, layout).and_then(|_| load_layout(&buffer[..]));

    vec![match outcome {
        Ok(loaded) => TestResult {
            name: "persistence_roundtrip".into(),
            passed: loaded.positions() == layout.positions() && loaded.seed == layout.seed,
            detail: format!("{} bytes", buffer.len()),
        },
        Err(e) => TestResult {
            name: "persistence_roundtrip".into(),
            passed: false,
            detail: e.to_string(),
        },
    }]
}

fn print_layout_json(layout: &MansionLayout) {
    let rooms: Vec<_> = layout
        .rooms
        .iter()
        .map(|r| {
            let p = r.world_position();
            serde_json::json!({
                "name": r.name,
                "floor": r.assigned_floor,
                "x": p.x,
                "y": p.y,
                "elevation": r.elevation,
                "open_doorways": r.floors.iter().map(|f| f.doorways.len()).sum::<usize>(),
            })
        })
        .collect();
    let doc = serde_json::json!({
        "seed": layout.seed,
        "rooms": rooms,
        "stats": {
            "placed": layout.stats.placed,
            "discarded": layout.stats.discarded,
            "collision_queries": layout.stats.collision_queries,
        },
    });
    match serde_json::to_string_pretty(&doc) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("layout JSON failed: {}", e),
    }
}
