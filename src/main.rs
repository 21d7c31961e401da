mod api;
mod app;
mod sim;
mod util;

use clap::Parser;

use api::FetchParams;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the archive data API.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    api_url: String,

    /// Drop edges below this weight before layout.
    #[arg(long, default_value_t = 10)]
    min_weight: u32,

    /// Cap on the number of rendered entities.
    #[arg(long, default_value_t = 100)]
    max_nodes: u32,

    /// Start on the ego network of this entity instead of the global graph.
    #[arg(long)]
    ego: Option<String>,

    /// Traversal depth of the ego network (1 or 2).
    #[arg(long, default_value_t = 1)]
    ego_depth: u32,
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let params = FetchParams {
        min_weight: args.min_weight.clamp(1, 100),
        max_nodes: args.max_nodes.clamp(20, 300),
        ego: args.ego,
        ego_depth: args.ego_depth.clamp(1, 2),
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "archnet",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ArchnetApp::new(
                cc,
                args.api_url.clone(),
                params.clone(),
            )))
        }),
    )
}
