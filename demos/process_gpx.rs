//! Process a GPX file from disk and print the resulting route data.
//!
//! Usage: cargo run --example process_gpx -- path/to/track.gpx

use route_engine::{process_track, EngineConfig};

fn main() {
    let path = std::env::args().nth(1).expect("usage: process_gpx <track.gpx>");
    let bytes = std::fs::read(&path).expect("failed to read track file");

    let route = match process_track(&bytes, &EngineConfig::default()) {
        Ok(route) => route,
        Err(e) => {
            eprintln!("failed to process {path}: {e}");
            std::process::exit(1);
        }
    };

    println!("distance:  {:.2} km", route.summary.total_distance_km);
    println!(
        "elevation: +{:.0} m / -{:.0} m",
        route.summary.elevation_gain_m, route.summary.elevation_loss_m
    );
    println!(
        "points:    {} raw -> {} simplified",
        route.raw_point_count,
        route.simplified_points.len()
    );

    if let Some(stats) = &route.statistics {
        if let (Some(avg), Some(moving)) = (stats.avg_speed_kmh, stats.moving_time_minutes) {
            println!("avg speed: {avg:.1} km/h over {moving:.0} min moving");
        }
        for (i, climb) in stats.top_climbs.iter().enumerate() {
            println!(
                "climb {}:   {:.1}-{:.1} km, +{:.0} m at {:.1}% (score {:.0})",
                i + 1,
                climb.start_distance_km,
                climb.end_distance_km,
                climb.elevation_gain_m,
                climb.average_gradient_percent,
                climb.difficulty_score
            );
        }
    }
}
