use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};

use crate::api::{self, FetchParams, GraphData};
use crate::sim::Simulation;

mod graph;
mod render_utils;
mod ui;

// Fixed layout seed: re-mounting the same snapshot reproduces the same
// initial placement.
const LAYOUT_SEED: u64 = 0x6172_636e_6574;

pub struct ArchnetApp {
    api_url: String,
    state: AppState,
    reload_rx: Option<Receiver<Result<GraphData, String>>>,
}

enum AppState {
    Loading {
        params: FetchParams,
        rx: Receiver<Result<GraphData, String>>,
    },
    Ready(Box<ViewModel>),
    Error {
        params: FetchParams,
        message: String,
    },
}

struct ViewModel {
    /// Raw snapshot as fetched; kept so a resize can re-initialize the
    /// layout without another round-trip.
    data: GraphData,
    min_weight: u32,
    max_nodes: u32,
    ego: String,
    ego_depth: u32,
    sim: Option<Simulation>,
    snapshot_dirty: bool,
    canvas_size: Vec2,
    drag_node: Option<usize>,
    activated: Option<String>,
}

impl ViewModel {
    fn new(data: GraphData, params: &FetchParams) -> Self {
        Self {
            data,
            min_weight: params.min_weight,
            max_nodes: params.max_nodes,
            ego: params.ego.clone().unwrap_or_default(),
            ego_depth: params.ego_depth,
            sim: None,
            snapshot_dirty: true,
            canvas_size: Vec2::ZERO,
            drag_node: None,
            activated: None,
        }
    }

    fn fetch_params(&self) -> FetchParams {
        let ego = self.ego.trim();
        FetchParams {
            min_weight: self.min_weight,
            max_nodes: self.max_nodes,
            ego: (!ego.is_empty()).then(|| ego.to_owned()),
            ego_depth: self.ego_depth,
        }
    }

    fn show(&mut self, ctx: &Context, reload_requested: &mut bool, is_reloading: bool) {
        egui::SidePanel::left("controls_panel")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                self.draw_controls(ui, reload_requested, is_reloading);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_graph(ui);
        });
    }
}

impl ArchnetApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, api_url: String, params: FetchParams) -> Self {
        let state = Self::start_load(&api_url, params);
        Self {
            api_url,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(api_url: &str, params: FetchParams) -> Receiver<Result<GraphData, String>> {
        let (tx, rx) = mpsc::channel();
        let api_url = api_url.to_owned();

        thread::spawn(move || {
            let result = api::fetch_graph(&api_url, &params).map_err(|error| error.to_string());
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(api_url: &str, params: FetchParams) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(api_url, params.clone()),
            params,
        }
    }
}

impl eframe::App for ArchnetApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { params, rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(data) => AppState::Ready(Box::new(ViewModel::new(data, params))),
                        Err(message) => AppState::Error {
                            params: params.clone(),
                            message,
                        },
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading entity network...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error { params, message } => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load entity network");
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(&self.api_url, params.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(&self.api_url, model.fetch_params()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            let params = model.fetch_params();
                            transition = Some(match result {
                                Ok(data) => {
                                    AppState::Ready(Box::new(ViewModel::new(data, &params)))
                                }
                                Err(message) => AppState::Error { params, message },
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error {
                                params: model.fetch_params(),
                                message: "Background fetch worker disconnected".to_owned(),
                            });
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
