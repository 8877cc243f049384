use crate::ui::state::AppState;
use eframe::egui;

pub fn render(ui: &mut egui::Ui, state: &AppState) {
    ui.horizontal(|ui| {
        // Chấm xanh khi đã kết nối, đỏ khi mất kết nối
        let (color, label) = if state.connected {
            (egui::Color32::GREEN, "Connected")
        } else {
            (egui::Color32::RED, "Disconnected")
        };
        ui.colored_label(color, "●");
        ui.label(label);

        ui.separator();
        let count = state
            .user_count
            .map(|count| count.to_string())
            .unwrap_or_else(|| "-".to_string());
        ui.label(format!("Online: {count}"));

        ui.separator();
        ui.label(egui::RichText::new(format!("You are {}", state.identity)).weak());
    });
}
