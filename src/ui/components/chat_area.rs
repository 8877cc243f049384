use eframe::egui;

use crate::common::StatusLevel;
use crate::ui::state::{ChatLine, format_time};

const OWN_BUBBLE: egui::Color32 = egui::Color32::from_rgb(79, 70, 229);
const PEER_BUBBLE: egui::Color32 = egui::Color32::from_rgb(55, 65, 81);

pub fn render(ui: &mut egui::Ui, lines: &[ChatLine]) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for line in lines {
                match line {
                    ChatLine::Message { message, own } => {
                        let layout = if *own {
                            egui::Layout::top_down(egui::Align::Max)
                        } else {
                            egui::Layout::top_down(egui::Align::Min)
                        };
                        ui.with_layout(layout, |ui| {
                            // Tin của mình không cần hiện tên
                            if !own {
                                ui.label(egui::RichText::new(&message.user).small().weak());
                            }
                            let fill = if *own { OWN_BUBBLE } else { PEER_BUBBLE };
                            egui::Frame::new()
                                .fill(fill)
                                .corner_radius(egui::CornerRadius::same(6))
                                .inner_margin(egui::Margin::same(8))
                                .show(ui, |ui| {
                                    ui.colored_label(egui::Color32::WHITE, message.text.as_str());
                                });
                            ui.label(
                                egui::RichText::new(format_time(message.timestamp))
                                    .small()
                                    .weak(),
                            );
                        });
                    }
                    ChatLine::Notice { text, level } => {
                        let color = match level {
                            StatusLevel::Error => egui::Color32::from_rgb(248, 113, 113),
                            StatusLevel::Success => egui::Color32::from_rgb(74, 222, 128),
                            StatusLevel::Info => egui::Color32::GRAY,
                        };
                        ui.vertical_centered(|ui| {
                            ui.colored_label(color, text.as_str());
                        });
                    }
                }
                ui.add_space(6.0);
            }
        });
}
