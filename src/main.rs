use std::convert::TryFrom;

use clap::{crate_version, App, Arg, SubCommand};
use serde::Serialize;

use sweep_router::config::Schedule;
use sweep_router::data::RoadGraph;
use sweep_router::gj::edges_to_geojson;
use sweep_router::graph::{EdgeKey, MultiDiGraph};
use sweep_router::pipeline;

#[derive(Serialize)]
struct BlockOutput {
    routes: Vec<Vec<EdgeKey>>,
    tour: Vec<EdgeKey>,
}

fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"));

    let matches = App::new("Arc Routing Engine")
        .version(crate_version!())
        .about("Sweep a road network and split the result into time-bounded routes")
        .subcommand(
            SubCommand::with_name("solve")
                .about("Run the routing engine once per schedule block")
                .arg(Arg::with_name("road-graph").takes_value(true).required(true).index(1).help("Road graph JSON"))
                .arg(Arg::with_name("schedule").takes_value(true).required(true).index(2).help("Schedule YAML"))
                .arg(Arg::with_name("out-dir").takes_value(true).required(true).index(3).help("Output directory")),
        )
        .get_matches();

    if let Some(matches) = matches.subcommand_matches("solve") {
        let road_graph_path = matches.value_of("road-graph").unwrap();
        let schedule_path = matches.value_of("schedule").unwrap();
        let out_dir = matches.value_of("out-dir").unwrap();

        log::info!("loading road graph from {road_graph_path}");
        let road_graph: RoadGraph =
            serde_json::from_reader(std::fs::File::open(road_graph_path)?).expect("road graph: invalid JSON");
        let f = MultiDiGraph::try_from(&road_graph).expect("road graph: inconsistent topology");

        log::info!("loading schedule from {schedule_path}");
        let schedule: Schedule =
            serde_yaml::from_reader(std::fs::File::open(schedule_path)?).expect("schedule: invalid YAML");

        std::fs::create_dir_all(out_dir)?;

        for (i, block) in schedule.schedule.iter().enumerate() {
            log::info!("block {i}: {:?} {:?}", block.days, block.time_window);
            let allowed = block.allowed_types();
            let route_time_hours = block.route_time_hours().expect("schedule: invalid time window");

            match pipeline::solve(&f, &allowed, route_time_hours) {
                Ok(out) => {
                    let json_path = format!("{out_dir}/{i}.json");
                    let geojson_path = format!("{out_dir}/{i}.geojson");

                    let body = BlockOutput { routes: out.routes, tour: out.tour.clone() };
                    serde_json::to_writer(std::fs::File::create(&json_path)?, &body).expect("failed to write routes JSON");

                    let geometry = edges_to_geojson(&out.e, &out.tour);
                    serde_json::to_writer(std::fs::File::create(&geojson_path)?, &geometry)
                        .expect("failed to write tour GeoJSON");

                    log::info!("block {i}: wrote {json_path} and {geojson_path}");
                }
                Err(e) => {
                    log::error!("block {i} failed: {e}");
                }
            }
        }
    }

    Ok(())
}
