use std::sync::Arc;

use eframe::egui;

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::data::fetch::{Fetcher, Notify};
use crate::state::AppState;
use crate::ui::{panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TimetableApp {
    pub state: AppState,
    pub context: AppContext,
}

impl TimetableApp {
    /// Restore persisted settings and start fetching the indexes.
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let context = AppContext::load(cc.storage);
        cc.egui_ctx.set_theme(context.theme.preference());

        // Worker threads wake the UI when their results are ready.
        let repaint = cc.egui_ctx.clone();
        let notify: Notify = Arc::new(move || repaint.request_repaint());

        Self {
            state: AppState::new(config, fetcher, Some(notify)),
            context,
        }
    }
}

impl eframe::App for TimetableApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.state.poll();

        // ---- Top panel: title, counts, theme toggle ----
        let theme_changed = egui::TopBottomPanel::top("top_bar")
            .show(ctx, |ui| panels::top_bar(ui, &self.state, &mut self.context))
            .inner;
        if theme_changed {
            ctx.set_theme(self.context.theme.preference());
            if let Some(storage) = frame.storage_mut() {
                self.context.save(storage);
            }
        }

        // ---- Bottom panel: footer ----
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            panels::footer(ui);
        });

        // ---- Left side panel: source and filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: timetable ----
        egui::CentralPanel::default().show(ctx, |ui| {
            table::timetable(ui, &self.state);
        });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.context.save(storage);
    }
}
